//! Abstract syntax tree for transform expressions
//!
//! Copyright (c) 2025 Remold Team
//! Licensed under the Apache-2.0 license

/// A compiled transform expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Literal(Literal),
    /// The single implicit input binding, `value`
    Value,
    /// Unary operation
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Binary operation
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Conditional expression (`cond ? a : b`)
    Ternary {
        condition: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
    /// Builtin function call
    Call { func: Builtin, arg: Box<Expr> },
}

/// Literal values in expression source
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation (`-`)
    Neg,
    /// Logical negation (`!`)
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// The closed set of builtin functions, all unary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Upper,
    Lower,
    Trim,
    Len,
    Str,
    Num,
    Abs,
    Round,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "upper" => Some(Builtin::Upper),
            "lower" => Some(Builtin::Lower),
            "trim" => Some(Builtin::Trim),
            "len" => Some(Builtin::Len),
            "str" => Some(Builtin::Str),
            "num" => Some(Builtin::Num),
            "abs" => Some(Builtin::Abs),
            "round" => Some(Builtin::Round),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Upper => "upper",
            Builtin::Lower => "lower",
            Builtin::Trim => "trim",
            Builtin::Len => "len",
            Builtin::Str => "str",
            Builtin::Num => "num",
            Builtin::Abs => "abs",
            Builtin::Round => "round",
        }
    }
}
