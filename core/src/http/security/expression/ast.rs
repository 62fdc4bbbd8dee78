//! Abstract Syntax Tree for `allow_if` expressions.

/// Binary operators, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Logical OR (at least one must be true)
    Or,
    /// Logical AND (both must be true)
    And,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    /// Membership: `'ROLE_ADMIN' in roles`
    In,
    NotIn,
    /// Regex match: `request.getPathInfo() matches '/^\/admin/'`
    Matches,
}

/// Unary operators for modifying expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical NOT (inverts the result)
    Not,
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

/// An expression AST node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),

    /// A context variable, e.g. `user`
    Variable(String),

    /// `[a, b, c]`
    Array(Vec<Expression>),

    /// A function call with name and arguments
    /// e.g., `is_granted('ROLE_ADMIN')`
    Function { name: String, args: Vec<Expression> },

    /// Property access (`user.username`) or method call
    /// (`request.client_ip()`, `args` is `Some`)
    Member {
        object: Box<Expression>,
        name: String,
        args: Option<Vec<Expression>>,
    },

    /// A binary operation combining two expressions
    Binary {
        left: Box<Expression>,
        op: BinaryOp,
        right: Box<Expression>,
    },

    /// A unary operation on an expression
    /// e.g., `not is_anonymous()`
    Unary { op: UnaryOp, expr: Box<Expression> },

    /// A grouped expression (parentheses)
    Group(Box<Expression>),
}

impl Expression {
    /// Creates a new function expression.
    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Function {
            name: name.into(),
            args,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal(Literal::String(value.into()))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    pub fn binary(left: Expression, op: BinaryOp, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Creates a new AND expression.
    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::binary(left, BinaryOp::And, right)
    }

    /// Creates a new OR expression.
    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::binary(left, BinaryOp::Or, right)
    }

    /// Creates a new NOT expression.
    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: Expression) -> Self {
        Expression::Unary {
            op: UnaryOp::Not,
            expr: Box::new(expr),
        }
    }

    /// Names of the variables referenced anywhere in the tree.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expression::Literal(_) => {}
            Expression::Variable(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Expression::Array(items) | Expression::Function { args: items, .. } => {
                items.iter().for_each(|e| e.collect_variables(names));
            }
            Expression::Member { object, args, .. } => {
                object.collect_variables(names);
                for arg in args.iter().flatten() {
                    arg.collect_variables(names);
                }
            }
            Expression::Binary { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            Expression::Unary { expr, .. } | Expression::Group(expr) => {
                expr.collect_variables(names)
            }
        }
    }
}
