/// Unique unit identifier, compared as text.
/// Examples: `S-1042`, `1042`
pub type UnitId = String;
/// Name of a column in the input table.
/// Examples: `Store_ID`, `Country`, `Store_Format`
pub type ColumnName = String;
/// Raw cell value as read from the input table.
/// Examples: ` de `, `Hypermarket`, `FR`
pub type AttrValue = String;
/// One normalized component of a stratum key.
/// Examples: `DE`, `HYPERMARKET`, `UNKNOWN`
pub type KeyPart = String;
