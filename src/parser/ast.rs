#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    NumericLiteral(f64),
    StringLiteral(String),
    BooleanLiteral(bool),
    /// Local variable; the name never carries a sigil.
    Identifier(String),
    /// Global variable; the name keeps its leading `$`.
    GlobalIdentifier(String),
    ArrayLiteral(Vec<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        lhs: Box<Expr>,
        op: BinaryOp,
        rhs: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        op: AssignOp,
        value: Box<Expr>,
    },
    Member {
        object: Box<Expr>,
        key: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::NumericLiteral(_) => "NumericLiteral",
            Expr::StringLiteral(_) => "StringLiteral",
            Expr::BooleanLiteral(_) => "BooleanLiteral",
            Expr::Identifier(_) => "Identifier",
            Expr::GlobalIdentifier(_) => "GlobalIdentifier",
            Expr::ArrayLiteral(_) => "ArrayLiteral",
            Expr::Unary { .. } => "UnaryExpr",
            Expr::Binary { .. } => "BinaryExpr",
            Expr::Assign { .. } => "AssignmentExpr",
            Expr::Member { .. } => "MemberExpr",
            Expr::Call { .. } => "CallExpr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negative,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    pub fn is_update(self) -> bool {
        !matches!(self, UnaryOp::Not | UnaryOp::Negative)
    }

    pub fn is_prefix(self) -> bool {
        !matches!(self, UnaryOp::PostIncrement | UnaryOp::PostDecrement)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    /// `&&`
    LogicalAnd,
    /// `&`, same truth table as `&&`
    And,
    /// `||`
    LogicalOr,
    /// `|`, same truth table as `||`
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    Arithmetic,
    Comparison,
    Logical,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 15] = [
        BinaryOp::Add,
        BinaryOp::Subtract,
        BinaryOp::Multiply,
        BinaryOp::Divide,
        BinaryOp::Power,
        BinaryOp::Less,
        BinaryOp::Greater,
        BinaryOp::LessEqual,
        BinaryOp::GreaterEqual,
        BinaryOp::Equal,
        BinaryOp::NotEqual,
        BinaryOp::LogicalAnd,
        BinaryOp::And,
        BinaryOp::LogicalOr,
        BinaryOp::Or,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Power => "^",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::And => "&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::Or => "|",
        }
    }

    /// Upper-case operation name used in error messages.
    pub fn error_name(self) -> &'static str {
        match self {
            BinaryOp::Add => "ADD",
            BinaryOp::Subtract => "SUBTRACT",
            BinaryOp::Multiply => "MULTIPLY",
            BinaryOp::Divide => "DIVIDE",
            BinaryOp::Power => "POWER",
            BinaryOp::Less => "LESS THAN",
            BinaryOp::Greater => "GREATER THAN",
            BinaryOp::LessEqual => "LESS THAN OR EQUAL",
            BinaryOp::GreaterEqual => "GREATER THAN OR EQUAL",
            BinaryOp::Equal => "EQUAL",
            BinaryOp::NotEqual => "NOT EQUAL",
            BinaryOp::LogicalAnd | BinaryOp::And => "AND",
            BinaryOp::LogicalOr | BinaryOp::Or => "OR",
        }
    }

    pub fn class(self) -> OpClass {
        match self {
            BinaryOp::Add
            | BinaryOp::Subtract
            | BinaryOp::Multiply
            | BinaryOp::Divide
            | BinaryOp::Power => OpClass::Arithmetic,
            BinaryOp::Less
            | BinaryOp::Greater
            | BinaryOp::LessEqual
            | BinaryOp::GreaterEqual
            | BinaryOp::Equal
            | BinaryOp::NotEqual => OpClass::Comparison,
            BinaryOp::LogicalAnd | BinaryOp::And | BinaryOp::LogicalOr | BinaryOp::Or => {
                OpClass::Logical
            }
        }
    }

    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessEqual | BinaryOp::GreaterEqual
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubtractAssign,
}

impl AssignOp {
    /// Binary operator a compound assignment reuses; `None` for plain `=`.
    pub fn binary_op(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinaryOp::Add),
            AssignOp::SubtractAssign => Some(BinaryOp::Subtract),
        }
    }
}
