/// Error code registry for Neighbourer
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Schema errors
/// - 3000-3999: Parse errors
/// - 4000-4999: Adjacency errors
/// - 5000-5999: I/O errors
/// - 9000-9999: Other errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_TOML: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1003;

    // Schema errors (2000-2999)
    pub const SCHEMA_GENERIC: u16 = 2000;
    pub const SCHEMA_MISSING_HEADER: u16 = 2001;
    pub const SCHEMA_NO_ATTRIBUTES: u16 = 2002;
    pub const SCHEMA_DUPLICATE_COLUMN: u16 = 2003;
    pub const SCHEMA_COLUMN_COUNT: u16 = 2004;
    pub const SCHEMA_DERIVED_COLLISION: u16 = 2005;

    // Parse errors (3000-3999)
    pub const PARSE_GENERIC: u16 = 3000;
    pub const PARSE_INVALID_CELL_ID: u16 = 3001;
    pub const PARSE_INVALID_VALUE: u16 = 3002;
    pub const PARSE_NON_FINITE_VALUE: u16 = 3003;

    // Adjacency errors (4000-4999)
    pub const ADJACENCY_INVALID_CELL: u16 = 4001;
    pub const ADJACENCY_UNSUPPORTED_RADIUS: u16 = 4002;

    // I/O errors (5000-5999)
    pub const IO_GENERIC: u16 = 5000;
    pub const IO_NOT_FOUND: u16 = 5001;
    pub const IO_PERMISSION_DENIED: u16 = 5002;
    pub const IO_READ_FAILED: u16 = 5003;
    pub const IO_WRITE_FAILED: u16 = 5004;
    pub const IO_PERSIST_FAILED: u16 = 5005;
    pub const IO_CSV: u16 = 5006;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
    pub const OTHER_NON_FINITE_SUM: u16 = 9001;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        // Configuration errors
        1000 => "Generic configuration error",
        1001 => "Configuration file not found",
        1002 => "Invalid TOML syntax in configuration",
        1003 => "Invalid value in configuration",

        // Schema errors
        2000 => "Generic schema error",
        2001 => "Input has no header row",
        2002 => "Header declares no attribute columns",
        2003 => "Header declares the same column twice",
        2004 => "Row has the wrong number of columns",
        2005 => "Source column collides with a derived column name",

        // Parse errors
        3000 => "Generic parse error",
        3001 => "Cell identifier is not hexadecimal",
        3002 => "Attribute value is not a number",
        3003 => "Attribute value is not finite",

        // Adjacency errors
        4001 => "Grid system rejected the cell identifier",
        4002 => "Unsupported neighbourhood radius",

        // I/O errors
        5000 => "Generic I/O error",
        5001 => "File not found",
        5002 => "Permission denied",
        5003 => "Failed to read input",
        5004 => "Failed to write output",
        5005 => "Failed to move output into place",
        5006 => "CSV stream error",

        // Other errors
        9000 => "Generic error",
        9001 => "Neighbour sum is not finite",

        _ => "Unknown error code",
    }
}
