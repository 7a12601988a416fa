use std::fmt;

/// A node of the parsed keymap expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// `def name(params) body end`
    Definition {
        /// Name being defined.
        name: String,
        /// Parameter names, in declaration order.
        params: Vec<String>,
        /// Expression the definition expands to.
        body: Box<Node>,
    },
    /// Integer literal.
    Integer(i64),
    /// Bare identifier, e.g. a key code such as `KC_A`.
    VarRef(String),
    /// Macro invocation.
    Call {
        /// Name of the invoked macro.
        callee: String,
        /// Arguments in source order; the position of an argument is significant.
        args: Vec<Node>,
    },
}

impl Node {
    pub fn call(callee: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Call {
            callee: callee.into(),
            args,
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Node::VarRef(name.into())
    }

    /// Callee and arguments if this is a call.
    pub fn as_call(&self) -> Option<(&str, &[Node])> {
        match self {
            Node::Call { callee, args } => Some((callee.as_str(), args.as_slice())),
            _ => None,
        }
    }

    pub fn as_var_ref(&self) -> Option<&str> {
        match self {
            Node::VarRef(name) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Node::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Node::Definition { .. } => "definition",
            Node::Integer(_) => "integer",
            Node::VarRef(_) => "identifier",
            Node::Call { .. } => "call",
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Definition { name, params, body } => {
                write!(f, "def {name}(")?;
                write_list(f, params)?;
                write!(f, ") {body} end")
            }
            Node::Integer(value) => write!(f, "{value}"),
            Node::VarRef(name) => f.write_str(name),
            Node::Call { callee, args } => {
                write!(f, "{callee}(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_source_form() {
        let node = Node::call(
            "LAYOUT",
            vec![Node::var("KC_A"), Node::call("LT", vec![Node::Integer(8), Node::var("KC_S")])],
        );
        assert_eq!(node.to_string(), "LAYOUT(KC_A, LT(8, KC_S))");

        let def = Node::Definition {
            name: "f".into(),
            params: vec!["a".into(), "b".into()],
            body: Box::new(Node::call("g", vec![Node::var("a"), Node::var("b")])),
        };
        assert_eq!(def.to_string(), "def f(a, b) g(a, b) end");
        assert_eq!(Node::call("f", vec![]).to_string(), "f()");
    }

    #[test]
    fn accessors() {
        assert_eq!(Node::var("KC_A").as_var_ref(), Some("KC_A"));
        assert_eq!(Node::Integer(8).as_integer(), Some(8));
        assert_eq!(Node::Integer(8).as_var_ref(), None);
        let call = Node::call("LT", vec![Node::Integer(8)]);
        assert_eq!(call.as_call().map(|(callee, args)| (callee, args.len())), Some(("LT", 1)));
        assert_eq!(call.describe(), "call");
    }
}
