#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrCode {
    /// Class defined twice
    CLS5000     = 5000,

    /// Built-in class redefined
    CLS5001     = 5001,

    /// Parent class not found
    CLS5002     = 5002,

    /// Inheriting from Int, Bool or String
    CLS5003     = 5003,

    /// Class unreachable from the root
    CLS5004     = 5004,

    /// Attribute redefines an inherited attribute
    CLS5005     = 5005,

    /// No `Main` class
    CLS5006     = 5006,

    /// `Main` doesn't define `main`
    CLS5007     = 5007,

    /// Identifier bound nowhere
    INT6000     = 6000,

    /// Class not in the class table
    INT6001     = 6001,

    /// Method not in the dispatch table
    INT6002     = 6002,

    /// Literal missing from the constant pool
    INT6003     = 6003,

    /// Scope closed more often than opened
    INT6004     = 6004
}
