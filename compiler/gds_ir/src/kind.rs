//! Token kinds: keywords, punctuation, operators, leaf kinds, node kinds and
//! the named slots each node kind declares.

use std::fmt;

macro_rules! spelled {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $text:literal,)* }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name { $($variant,)* }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            /// Source spelling.
            pub const fn as_str(self) -> &'static str {
                match self { $($name::$variant => $text,)* }
            }

            /// Look up a spelling.
            pub fn from_text(text: &str) -> Option<Self> {
                match text {
                    $($text => Some($name::$variant),)*
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

spelled! {
    /// Reserved words.
    pub enum Keyword {
        And => "and",
        As => "as",
        Await => "await",
        Break => "break",
        Breakpoint => "breakpoint",
        Class => "class",
        ClassName => "class_name",
        Const => "const",
        Continue => "continue",
        Elif => "elif",
        Else => "else",
        Enum => "enum",
        Extends => "extends",
        False => "false",
        For => "for",
        Func => "func",
        If => "if",
        In => "in",
        Is => "is",
        Match => "match",
        Not => "not",
        Null => "null",
        Or => "or",
        Pass => "pass",
        Return => "return",
        SelfKw => "self",
        Signal => "signal",
        Static => "static",
        Super => "super",
        True => "true",
        Var => "var",
        While => "while",
    }
}

impl Keyword {
    /// Keywords that are complete operands on their own.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Keyword::True | Keyword::False | Keyword::Null | Keyword::SelfKw | Keyword::Super
        )
    }
}

spelled! {
    /// Fixed punctuation.
    pub enum Punct {
        Colon => ":",
        Comma => ",",
        Semicolon => ";",
        Point => ".",
        DoubleDot => "..",
        OpenParen => "(",
        CloseParen => ")",
        OpenBracket => "[",
        CloseBracket => "]",
        OpenBrace => "{",
        CloseBrace => "}",
        At => "@",
    }
}

/// Operators. One kind may have several spellings (`and` / `&&`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperatorKind {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    PowAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    ShlAssign,
    ShrAssign,
    As,
    Or,
    And,
    In,
    /// `not in`; the leaf holds `not`, the `in` follows as an extra.
    NotIn,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Is,
    Not,
    Negate,
    Identity,
    BitNot,
    Arrow,
}

/// Binding strength of the ternary `if`/`else`.
pub const TERNARY_PRECEDENCE: u8 = 3;
/// Binding strength of prefix `await`.
pub const AWAIT_PRECEDENCE: u8 = 19;

/// Symbolic operator spellings, longest first within each leading char so a
/// greedy reader can stop as soon as no spelling extends the text read.
pub const SYMBOLIC_OPERATORS: &[&str] = &[
    "**=", "<<=", ">>=", "**", "<<", ">>", "<=", ">=", "==", "!=", "+=", "-=", "*=", "/=", "%=",
    "&=", "|=", "^=", "&&", "||", "->", "=", "<", ">", "+", "-", "*", "/", "%", "&", "|", "^",
    "~", "!",
];

impl OperatorKind {
    /// Every spelling of this operator.
    pub fn spellings(self) -> &'static [&'static str] {
        match self {
            OperatorKind::Assign => &["="],
            OperatorKind::AddAssign => &["+="],
            OperatorKind::SubAssign => &["-="],
            OperatorKind::MulAssign => &["*="],
            OperatorKind::DivAssign => &["/="],
            OperatorKind::ModAssign => &["%="],
            OperatorKind::PowAssign => &["**="],
            OperatorKind::BitAndAssign => &["&="],
            OperatorKind::BitOrAssign => &["|="],
            OperatorKind::BitXorAssign => &["^="],
            OperatorKind::ShlAssign => &["<<="],
            OperatorKind::ShrAssign => &[">>="],
            OperatorKind::As => &["as"],
            OperatorKind::Or => &["or", "||"],
            OperatorKind::And => &["and", "&&"],
            OperatorKind::In => &["in"],
            OperatorKind::NotIn | OperatorKind::Not => &["not", "!"],
            OperatorKind::Equal => &["=="],
            OperatorKind::NotEqual => &["!="],
            OperatorKind::Less => &["<"],
            OperatorKind::LessEqual => &["<="],
            OperatorKind::Greater => &[">"],
            OperatorKind::GreaterEqual => &[">="],
            OperatorKind::BitOr => &["|"],
            OperatorKind::BitXor => &["^"],
            OperatorKind::BitAnd => &["&"],
            OperatorKind::Shl => &["<<"],
            OperatorKind::Shr => &[">>"],
            OperatorKind::Add | OperatorKind::Identity => &["+"],
            OperatorKind::Sub | OperatorKind::Negate => &["-"],
            OperatorKind::Mul => &["*"],
            OperatorKind::Div => &["/"],
            OperatorKind::Mod => &["%"],
            OperatorKind::Pow => &["**"],
            OperatorKind::Is => &["is"],
            OperatorKind::BitNot => &["~"],
            OperatorKind::Arrow => &["->"],
        }
    }

    /// The operator a spelling denotes between two operands.
    pub fn binary_from_text(text: &str) -> Option<Self> {
        let kind = match text {
            "=" => OperatorKind::Assign,
            "+=" => OperatorKind::AddAssign,
            "-=" => OperatorKind::SubAssign,
            "*=" => OperatorKind::MulAssign,
            "/=" => OperatorKind::DivAssign,
            "%=" => OperatorKind::ModAssign,
            "**=" => OperatorKind::PowAssign,
            "&=" => OperatorKind::BitAndAssign,
            "|=" => OperatorKind::BitOrAssign,
            "^=" => OperatorKind::BitXorAssign,
            "<<=" => OperatorKind::ShlAssign,
            ">>=" => OperatorKind::ShrAssign,
            "as" => OperatorKind::As,
            "or" | "||" => OperatorKind::Or,
            "and" | "&&" => OperatorKind::And,
            "in" => OperatorKind::In,
            "==" => OperatorKind::Equal,
            "!=" => OperatorKind::NotEqual,
            "<" => OperatorKind::Less,
            "<=" => OperatorKind::LessEqual,
            ">" => OperatorKind::Greater,
            ">=" => OperatorKind::GreaterEqual,
            "|" => OperatorKind::BitOr,
            "^" => OperatorKind::BitXor,
            "&" => OperatorKind::BitAnd,
            "<<" => OperatorKind::Shl,
            ">>" => OperatorKind::Shr,
            "+" => OperatorKind::Add,
            "-" => OperatorKind::Sub,
            "*" => OperatorKind::Mul,
            "/" => OperatorKind::Div,
            "%" => OperatorKind::Mod,
            "**" => OperatorKind::Pow,
            "is" => OperatorKind::Is,
            _ => return None,
        };
        Some(kind)
    }

    /// The operator a spelling denotes before an operand.
    pub fn prefix_from_text(text: &str) -> Option<Self> {
        match text {
            "not" | "!" => Some(OperatorKind::Not),
            "-" => Some(OperatorKind::Negate),
            "+" => Some(OperatorKind::Identity),
            "~" => Some(OperatorKind::BitNot),
            _ => None,
        }
    }

    /// Precedence when used between two operands (higher binds tighter).
    pub fn binary_precedence(self) -> Option<u8> {
        let prec = match self {
            _ if self.is_assignment() => 1,
            OperatorKind::As => 2,
            OperatorKind::Or => 4,
            OperatorKind::And => 5,
            OperatorKind::In | OperatorKind::NotIn => 7,
            OperatorKind::Equal
            | OperatorKind::NotEqual
            | OperatorKind::Less
            | OperatorKind::LessEqual
            | OperatorKind::Greater
            | OperatorKind::GreaterEqual => 8,
            OperatorKind::BitOr => 9,
            OperatorKind::BitXor => 10,
            OperatorKind::BitAnd => 11,
            OperatorKind::Shl | OperatorKind::Shr => 12,
            OperatorKind::Add | OperatorKind::Sub => 13,
            OperatorKind::Mul | OperatorKind::Div | OperatorKind::Mod => 14,
            OperatorKind::Pow => 17,
            OperatorKind::Is => 18,
            _ => return None,
        };
        Some(prec)
    }

    /// Precedence of the operand a prefix operator applies to.
    pub fn prefix_precedence(self) -> Option<u8> {
        match self {
            OperatorKind::Not => Some(6),
            OperatorKind::Negate | OperatorKind::Identity => Some(15),
            OperatorKind::BitNot => Some(16),
            _ => None,
        }
    }

    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            OperatorKind::Assign
                | OperatorKind::AddAssign
                | OperatorKind::SubAssign
                | OperatorKind::MulAssign
                | OperatorKind::DivAssign
                | OperatorKind::ModAssign
                | OperatorKind::PowAssign
                | OperatorKind::BitAndAssign
                | OperatorKind::BitOrAssign
                | OperatorKind::BitXorAssign
                | OperatorKind::ShlAssign
                | OperatorKind::ShrAssign
        )
    }

    /// Assignments chain to the right; everything else to the left.
    pub fn is_right_associative(self) -> bool {
        self.is_assignment()
    }
}

/// Kind of a leaf token.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LeafKind {
    /// Spaces or tabs inside a line.
    Space,
    /// Leading whitespace of a line.
    Indentation,
    NewLine,
    CarriageReturn,
    /// `#` up to the end of the line.
    Comment,
    /// Backslash joining the next line (`\` plus the line break).
    LineContinuation,
    Identifier,
    Keyword(Keyword),
    Number,
    String,
    /// `$Path/To`, `$"quoted"`, `%Unique`.
    NodePath,
    Punct(Punct),
    Operator(OperatorKind),
    /// Text the grammar could not place.
    Invalid,
}

impl LeafKind {
    /// Whitespace, comments and line breaks.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            LeafKind::Space
                | LeafKind::Indentation
                | LeafKind::NewLine
                | LeafKind::CarriageReturn
                | LeafKind::Comment
                | LeafKind::LineContinuation
        )
    }
}

/// Named syntactic positions within a node's form.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Slot {
    Members,
    Static,
    Keyword,
    At,
    Name,
    ExtendsKeyword,
    Base,
    Comma,
    Icon,
    Arguments,
    Parameters,
    Values,
    Open,
    Close,
    TypeColon,
    Type,
    Assign,
    Value,
    Initializer,
    AccessorColon,
    Accessors,
    Method,
    Default,
    Arrow,
    ReturnType,
    Expression,
    Condition,
    Variable,
    InKeyword,
    Collection,
    Patterns,
    WhenKeyword,
    Guard,
    Cases,
    Colon,
    Body,
    ElseBranch,
    Left,
    Operator,
    Right,
    Operand,
    TrueValue,
    IfKeyword,
    ElseKeyword,
    FalseValue,
    Inner,
    Callee,
    Target,
    Subscript,
    Point,
    Member,
    Key,
}

impl Slot {
    pub fn name(self) -> &'static str {
        match self {
            Slot::Members => "members",
            Slot::Static => "static",
            Slot::Keyword => "keyword",
            Slot::At => "at",
            Slot::Name => "name",
            Slot::ExtendsKeyword => "extends_keyword",
            Slot::Base => "base",
            Slot::Comma => "comma",
            Slot::Icon => "icon",
            Slot::Arguments => "arguments",
            Slot::Parameters => "parameters",
            Slot::Values => "values",
            Slot::Open => "open",
            Slot::Close => "close",
            Slot::TypeColon => "type_colon",
            Slot::Type => "type",
            Slot::Assign => "assign",
            Slot::Value => "value",
            Slot::Initializer => "initializer",
            Slot::AccessorColon => "accessor_colon",
            Slot::Accessors => "accessors",
            Slot::Method => "method",
            Slot::Default => "default",
            Slot::Arrow => "arrow",
            Slot::ReturnType => "return_type",
            Slot::Expression => "expression",
            Slot::Condition => "condition",
            Slot::Variable => "variable",
            Slot::InKeyword => "in_keyword",
            Slot::Collection => "collection",
            Slot::Patterns => "patterns",
            Slot::WhenKeyword => "when_keyword",
            Slot::Guard => "guard",
            Slot::Cases => "cases",
            Slot::Colon => "colon",
            Slot::Body => "body",
            Slot::ElseBranch => "else_branch",
            Slot::Left => "left",
            Slot::Operator => "operator",
            Slot::Right => "right",
            Slot::Operand => "operand",
            Slot::TrueValue => "true_value",
            Slot::IfKeyword => "if_keyword",
            Slot::ElseKeyword => "else_keyword",
            Slot::FalseValue => "false_value",
            Slot::Inner => "inner",
            Slot::Callee => "callee",
            Slot::Target => "target",
            Slot::Subscript => "subscript",
            Slot::Point => "point",
            Slot::Member => "member",
            Slot::Key => "key",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of a node token.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    // Declarations
    File,
    ClassMembersList,
    InnerClass,
    Extends,
    ClassName,
    Annotation,
    Signal,
    Enum,
    EnumValuesList,
    EnumValue,
    Constant,
    Variable,
    AccessorsList,
    GetAccessor,
    SetAccessor,
    Method,
    ParametersList,
    Parameter,

    // Statements
    StatementsList,
    ExpressionStatement,
    VariableDeclaration,
    IfStatement,
    ElseBranch,
    ForStatement,
    WhileStatement,
    MatchStatement,
    MatchCasesList,
    MatchCase,
    PatternsList,
    MatchBinding,
    ReturnStatement,
    PassStatement,
    BreakStatement,
    ContinueStatement,
    BreakpointStatement,

    // Expressions
    DualOperator,
    SingleOperator,
    Ternary,
    Await,
    Parenthesized,
    Call,
    ArgumentsList,
    Indexer,
    Subscript,
    MemberAccess,
    ArrayInitializer,
    DictionaryInitializer,
    KeyValue,
    Lambda,
}

impl NodeKind {
    /// Slots this kind declares, in form order.
    pub fn slots(self) -> &'static [Slot] {
        use Slot as S;
        match self {
            NodeKind::File => &[S::Members],
            NodeKind::ClassMembersList
            | NodeKind::AccessorsList
            | NodeKind::StatementsList
            | NodeKind::MatchCasesList
            | NodeKind::PatternsList => &[],
            NodeKind::InnerClass => &[S::Keyword, S::Name, S::ExtendsKeyword, S::Base, S::Colon, S::Members],
            NodeKind::Extends => &[S::Keyword, S::Base],
            NodeKind::ClassName => &[S::Keyword, S::Name, S::Comma, S::Icon],
            NodeKind::Annotation => &[S::At, S::Name, S::Arguments],
            NodeKind::Signal => &[S::Keyword, S::Name, S::Parameters],
            NodeKind::Enum => &[S::Keyword, S::Name, S::Values],
            NodeKind::EnumValuesList
            | NodeKind::ParametersList
            | NodeKind::ArgumentsList
            | NodeKind::ArrayInitializer
            | NodeKind::DictionaryInitializer => &[S::Open, S::Close],
            NodeKind::EnumValue => &[S::Name, S::Assign, S::Value],
            NodeKind::Constant => &[S::Keyword, S::Name, S::TypeColon, S::Type, S::Assign, S::Value],
            NodeKind::Variable => &[
                S::Static,
                S::Keyword,
                S::Name,
                S::TypeColon,
                S::Type,
                S::Assign,
                S::Initializer,
                S::AccessorColon,
                S::Accessors,
            ],
            NodeKind::GetAccessor => &[S::Keyword, S::Assign, S::Method, S::Colon, S::Body],
            NodeKind::SetAccessor => &[S::Keyword, S::Parameters, S::Assign, S::Method, S::Colon, S::Body],
            NodeKind::Method => &[
                S::Static,
                S::Keyword,
                S::Name,
                S::Parameters,
                S::Arrow,
                S::ReturnType,
                S::Colon,
                S::Body,
            ],
            NodeKind::Parameter => &[S::Name, S::TypeColon, S::Type, S::Assign, S::Default],
            NodeKind::ExpressionStatement => &[S::Expression],
            NodeKind::VariableDeclaration => &[S::Keyword, S::Name, S::TypeColon, S::Type, S::Assign, S::Initializer],
            NodeKind::IfStatement => &[S::Keyword, S::Condition, S::Colon, S::Body, S::ElseBranch],
            NodeKind::ElseBranch => &[S::Keyword, S::Colon, S::Body],
            NodeKind::ForStatement => &[
                S::Keyword,
                S::Variable,
                S::TypeColon,
                S::Type,
                S::InKeyword,
                S::Collection,
                S::Colon,
                S::Body,
            ],
            NodeKind::WhileStatement => &[S::Keyword, S::Condition, S::Colon, S::Body],
            NodeKind::MatchStatement => &[S::Keyword, S::Value, S::Colon, S::Cases],
            NodeKind::MatchCase => &[S::Patterns, S::WhenKeyword, S::Guard, S::Colon, S::Body],
            NodeKind::MatchBinding => &[S::Keyword, S::Name],
            NodeKind::ReturnStatement => &[S::Keyword, S::Value],
            NodeKind::PassStatement
            | NodeKind::BreakStatement
            | NodeKind::ContinueStatement
            | NodeKind::BreakpointStatement => &[S::Keyword],
            NodeKind::DualOperator => &[S::Left, S::Operator, S::Right],
            NodeKind::SingleOperator => &[S::Operator, S::Operand],
            NodeKind::Ternary => &[S::TrueValue, S::IfKeyword, S::Condition, S::ElseKeyword, S::FalseValue],
            NodeKind::Await => &[S::Keyword, S::Operand],
            NodeKind::Parenthesized | NodeKind::Subscript => &[S::Open, S::Inner, S::Close],
            NodeKind::Call => &[S::Callee, S::Arguments],
            NodeKind::Indexer => &[S::Target, S::Subscript],
            NodeKind::MemberAccess => &[S::Target, S::Point, S::Member],
            NodeKind::KeyValue => &[S::Key, S::Colon, S::Assign, S::Value],
            NodeKind::Lambda => &[
                S::Keyword,
                S::Name,
                S::Parameters,
                S::Arrow,
                S::ReturnType,
                S::Colon,
                S::Body,
            ],
        }
    }

    /// Position of `slot` in this kind's form order.
    pub fn slot_index(self, slot: Slot) -> Option<usize> {
        self.slots().iter().position(|s| *s == slot)
    }

    /// Does this kind hold a repeating list of items?
    pub fn has_items(self) -> bool {
        matches!(
            self,
            NodeKind::ClassMembersList
                | NodeKind::AccessorsList
                | NodeKind::StatementsList
                | NodeKind::MatchCasesList
                | NodeKind::PatternsList
                | NodeKind::EnumValuesList
                | NodeKind::ParametersList
                | NodeKind::ArgumentsList
                | NodeKind::ArrayInitializer
                | NodeKind::DictionaryInitializer
        )
    }

    /// Line-oriented block lists whose items can be reparsed in isolation.
    pub fn is_block_list(self) -> bool {
        matches!(
            self,
            NodeKind::ClassMembersList
                | NodeKind::AccessorsList
                | NodeKind::StatementsList
                | NodeKind::MatchCasesList
        )
    }
}

/// Kind of any token.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    Leaf(LeafKind),
    Node(NodeKind),
}

impl TokenKind {
    pub fn is_leaf(self) -> bool {
        matches!(self, TokenKind::Leaf(_))
    }

    pub fn is_invalid(self) -> bool {
        self == TokenKind::Leaf(LeafKind::Invalid)
    }

    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Leaf(kind) if kind.is_trivia())
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Leaf(LeafKind::Keyword(kw)) => write!(f, "Keyword({kw})"),
            TokenKind::Leaf(LeafKind::Punct(p)) => write!(f, "Punct({p})"),
            TokenKind::Leaf(LeafKind::Operator(op)) => write!(f, "Operator({op:?})"),
            TokenKind::Leaf(kind) => write!(f, "{kind:?}"),
            TokenKind::Node(kind) => write!(f, "{kind:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_spellings_round_trip() {
        for kw in Keyword::ALL {
            assert_eq!(Keyword::from_text(kw.as_str()), Some(*kw));
        }
        assert_eq!(Keyword::from_text("class_name"), Some(Keyword::ClassName));
        assert_eq!(Keyword::from_text("get"), None);
    }

    #[test]
    fn symbolic_operators_are_known() {
        for text in SYMBOLIC_OPERATORS {
            assert!(
                OperatorKind::binary_from_text(text).is_some()
                    || OperatorKind::prefix_from_text(text).is_some()
                    || *text == "->",
                "{text}"
            );
        }
    }

    #[test]
    fn precedence_ladder() {
        let prec = |text| OperatorKind::binary_from_text(text).and_then(OperatorKind::binary_precedence);
        assert!(prec("=") < prec("or"));
        assert!(prec("or") < prec("and"));
        assert!(prec("and") < prec("=="));
        assert!(prec("==") < prec("+"));
        assert!(prec("+") < prec("*"));
        assert!(prec("*") < prec("**"));
        assert!(OperatorKind::Assign.is_right_associative());
        assert!(!OperatorKind::Greater.is_right_associative());
        assert_eq!(OperatorKind::Not.prefix_precedence(), Some(6));
    }

    #[test]
    fn slot_order_is_declared_per_kind() {
        assert_eq!(NodeKind::IfStatement.slot_index(Slot::Body), Some(3));
        assert_eq!(NodeKind::IfStatement.slot_index(Slot::Left), None);
        assert!(NodeKind::StatementsList.has_items());
        assert!(!NodeKind::DualOperator.has_items());
    }
}
