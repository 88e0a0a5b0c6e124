use crate::ast::{Expression, Node};

/// Parenthesised rendering of the tree, e.g. `($request. (header. accept))`
pub fn stringify(expression: &Expression) -> String {
    print_node(Node::root(expression))
}

fn print_node(node: Node<'_>) -> String {
    match node {
        Node::Single(e) => e.value.as_str().to_string(),
        Node::WithSource(e) => parenthesize(e.value.as_str(), node),
        Node::WithName(e) => parenthesize(e.value.as_str(), node),
        Node::Header(_) => parenthesize("header.", node),
        Node::Query(_) => parenthesize("query.", node),
        Node::Path(_) => parenthesize("path.", node),
        Node::Body(b) if b.pointer.is_some() => parenthesize("body #", node),
        Node::Body(_) => "body".to_string(),
        Node::Name(n) => n.value.clone(),
        Node::Token(t) => t.value.clone(),
        Node::JsonPointer(p) => p.value.clone(),
    }
}

fn parenthesize(head: &str, node: Node<'_>) -> String {
    let mut out = String::from("(");
    out.push_str(head);
    for child in node.children() {
        out.push(' ');
        out.push_str(&print_node(child));
    }
    out.push(')');
    out
}
