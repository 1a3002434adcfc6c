//! Compile-time error variants.

use thiserror::Error;

/// Errors raised by the compiler back-end.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// A call references a function that was never declared.
    #[error("reference to undeclared function \"{name}\"")]
    UndeclaredFunction {
        /// The referenced name.
        name: String,
    },
    /// A named function was defined twice.
    #[error("redefinition of function \"{name}\"")]
    Redefinition {
        /// The redefined name.
        name: String,
    },
    /// A value-returning function was called in statement position.
    #[error("function \"{name}\" called from statement")]
    FunctionInStatement {
        /// The called name.
        name: String,
    },
    /// A procedure was called where a value is required.
    #[error("procedure \"{name}\" called from expression")]
    ProcedureInExpression {
        /// The called name.
        name: String,
    },
    /// A jump patch found no unpatched `JMP`/`JNP` to resolve.
    #[error("no unpatched jump to resolve")]
    UnmatchedJumpPatch,
    /// A fragment's text normalized to nothing.
    #[error("fragment text is empty after normalization")]
    EmptyFragment,
    /// A fragment reference matched no declared pattern.
    #[error("couldn't match fragment \"{text}\"")]
    UnknownFragment {
        /// The unmatched text.
        text: String,
    },
    /// A fragment reference matched more than one declared pattern.
    #[error("ambiguous fragment \"{text}\"")]
    AmbiguousFragment {
        /// The ambiguous text.
        text: String,
    },
    /// A command header did not parse as any supported command form.
    #[error("could not parse command \"{text}\"")]
    BadCommandHeader {
        /// The normalized header text.
        text: String,
    },
    /// A symbol was bound to an entity twice.
    #[error("attempt to rebind symbol \"{name}\"")]
    SymbolRebound {
        /// The rebound symbol.
        name: String,
    },
    /// A symbol binding appeared outside an entity declaration.
    #[error("symbol binding outside an entity declaration")]
    NoEntityContext,
    /// An instruction argument does not fit in 24 bits.
    #[error(transparent)]
    ArgumentOutOfRange(#[from] ali_asm::ArgumentOutOfRange),
    /// A function event arrived while no function was open.
    #[error("no function is being defined")]
    NoOpenFunction,
    /// A function definition started while another was still open.
    #[error("function definition is already open")]
    FunctionAlreadyOpen,
    /// A call-argument event arrived with no call in progress.
    #[error("no call in progress")]
    NoOpenCall,
    /// Pattern-building events arrived in an impossible order.
    #[error("malformed pattern")]
    MalformedPattern,
    /// A synonym arrived outside any fragment declaration.
    #[error("synonym outside a fragment declaration")]
    NoFragmentContext,
    /// `finish` was called while a function was still open.
    #[error("unterminated function definition")]
    UnterminatedFunction,
    /// A function declared more parameters than the format can hold.
    #[error("too many parameters")]
    TooManyParameters,
    /// `finish` was called with a command lacking its body function.
    #[error("command has no body function")]
    UnboundCommand,
    /// Assembling or validating the module failed.
    #[error(transparent)]
    Module(#[from] ali_module::ModuleError),
}
