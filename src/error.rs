use crate::domesque::Node;

/// Errors raised by domesque.
///
/// The variants fall into three groups: invalid input (the caller passed a
/// value that cannot be used, such as [`Error::UnsupportedSource`] or
/// [`Error::NotTag`]), invalid operations (a well-typed request that would
/// break a tree invariant or a result contract, [`Error::InvalidOperation`]
/// and [`Error::NoRoot`]) and parse or I/O failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request would violate a tree invariant or a result-shape
    /// contract.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// The document currently has no root; assign one with
    /// [`Domesque::set_root`](crate::Domesque::set_root).
    #[error("document has no root node")]
    NoRoot,
    /// A document cannot be constructed from the given source.
    #[error("unsupported document source: {0}")]
    UnsupportedSource(String),
    /// The node is expected to be a tag node.
    #[error("node is not a tag node: {0:?}")]
    NotTag(Node),
    /// Comments cannot contain `--`.
    #[error("invalid comment: {0:?}")]
    InvalidComment(String),
    /// Processing instruction target is empty or reserved.
    #[error("invalid processing instruction target: {0:?}")]
    InvalidTarget(String),
    /// A prefix is used that has no namespace declaration in scope.
    #[error("unknown prefix: {0}")]
    UnknownPrefix(String),
    /// An attribute appears twice on the same tag.
    #[error("duplicate attribute: {0}")]
    DuplicateAttribute(String),
    /// The close tag does not match the open tag.
    #[error("close tag </{1}> does not match open tag <{0}>")]
    InvalidCloseTag(String, String),
    /// The input ended before all tags were closed.
    #[error("unclosed tag: {0}")]
    UnclosedTag(String),
    /// The input contains no element.
    #[error("no element found in input")]
    NoElement,
    /// An entity reference is not terminated with `;`.
    #[error("unclosed entity: {0}")]
    UnclosedEntity(String),
    /// An entity reference other than the predefined and character ones.
    #[error("invalid entity: {0}")]
    InvalidEntity(String),
    /// Entity declarations in a DTD are not supported.
    #[error("DTD entity declarations are not supported")]
    UnsupportedDtd,
    /// The bytes could not be decoded.
    #[error("cannot decode input: {0}")]
    Encoding(String),
    /// An XPath expression is malformed.
    #[error("XPath syntax error at position {position}: {message}")]
    XPathSyntax {
        /// Human readable description.
        message: String,
        /// Byte offset into the expression.
        position: usize,
    },
    /// An XPath expression calls a function that isn't available.
    #[error("unknown XPath function: {0}")]
    UnknownFunction(String),
    /// An XPath function was called with the wrong number of arguments.
    #[error("XPath function {0} called with {1} arguments")]
    FunctionArity(String, usize),
    /// Tokenizer error from the underlying XML parser.
    #[error("XML parse error: {0}")]
    Parser(#[from] xmlparser::Error),
    /// I/O error while reading or writing documents.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<indextree::NodeError> for Error {
    #[inline]
    fn from(e: indextree::NodeError) -> Self {
        Error::InvalidOperation(e.to_string())
    }
}
