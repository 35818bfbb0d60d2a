//! Evaluation of XPath expressions against a tree.

use std::cell::OnceCell;

use ahash::HashMap;
use indextree::NodeId;

use crate::domesque::{Domesque, Node};
use crate::error::Error;
use crate::id::{NameId, NamespaceId};
use crate::value::Value;

use super::ast::{Axis, BinaryOp, Expr, NodeTest, PathStart, Step};
use super::value::{number_to_string, string_to_number, Item, XPathValue};

#[derive(Debug, Clone, Copy)]
struct Context {
    item: Item,
    position: usize,
    size: usize,
}

/// A node test with its prefixes looked up.
enum ResolvedTest<'t> {
    /// A namespace of `None` was never used by any node, so nothing
    /// matches.
    Name {
        local: &'t str,
        namespace_id: Option<NamespaceId>,
    },
    Namespace(Option<NamespaceId>),
    Any,
    Node,
    Text,
    Comment,
    ProcessingInstruction(Option<&'t str>),
}

pub(crate) struct Evaluator<'a> {
    dom: &'a Domesque,
    context: Node,
    top: Node,
    namespaces: HashMap<String, Option<NamespaceId>>,
    order: OnceCell<HashMap<Node, usize>>,
}

impl<'a> Evaluator<'a> {
    /// Prepare to evaluate with `context` as the context node.
    ///
    /// The prefixes in scope at the context node are available to name
    /// tests, the unprefixed default namespace included. `namespaces` adds
    /// or overrides bindings.
    pub(crate) fn new(dom: &'a Domesque, context: Node, namespaces: &[(&str, &str)]) -> Self {
        let mut bindings = HashMap::default();
        for (prefix_id, namespace_id) in dom.namespaces_in_scope(context).iter() {
            bindings.insert(dom.prefix_str(*prefix_id).to_string(), Some(*namespace_id));
        }
        for (prefix, uri) in namespaces {
            bindings.insert(prefix.to_string(), dom.namespace(uri));
        }
        let arena = dom.arena();
        let top = context
            .get()
            .ancestors(arena)
            .last()
            .map(Node::new)
            .unwrap_or(context);
        Evaluator {
            dom,
            context,
            top,
            namespaces: bindings,
            order: OnceCell::new(),
        }
    }

    pub(crate) fn evaluate(&self, expr: &Expr) -> Result<XPathValue, Error> {
        self.check_prefixes(expr)?;
        let context = Context {
            item: Item::Node(self.context),
            position: 1,
            size: 1,
        };
        self.eval(expr, context)
    }

    fn check_prefixes(&self, expr: &Expr) -> Result<(), Error> {
        match expr {
            Expr::Number(_) | Expr::Literal(_) => Ok(()),
            Expr::Binary { left, right, .. } | Expr::Union(left, right) => {
                self.check_prefixes(left)?;
                self.check_prefixes(right)
            }
            Expr::Negate(expr) => self.check_prefixes(expr),
            Expr::Function { args, .. } => args.iter().try_for_each(|a| self.check_prefixes(a)),
            Expr::Filter { expr, predicates } => {
                self.check_prefixes(expr)?;
                predicates.iter().try_for_each(|p| self.check_prefixes(p))
            }
            Expr::Path { start, steps } => {
                if let PathStart::Expr(expr) = start {
                    self.check_prefixes(expr)?;
                }
                for step in steps {
                    self.resolve_test(&step.test, step.axis)?;
                    step.predicates
                        .iter()
                        .try_for_each(|p| self.check_prefixes(p))?;
                }
                Ok(())
            }
        }
    }

    fn eval(&self, expr: &Expr, context: Context) -> Result<XPathValue, Error> {
        match expr {
            Expr::Number(number) => Ok(XPathValue::Number(*number)),
            Expr::Literal(text) => Ok(XPathValue::String(text.clone())),
            Expr::Negate(expr) => {
                let value = self.eval(expr, context)?;
                Ok(XPathValue::Number(-self.number(&value)))
            }
            Expr::Binary { op, left, right } => self.binary(*op, left, right, context),
            Expr::Function { name, args } => self.call(name, args, context),
            Expr::Path { start, steps } => {
                let mut items = match start {
                    PathStart::Context => vec![context.item],
                    PathStart::Root => vec![Item::Node(self.top)],
                    PathStart::Expr(expr) => {
                        let value = self.eval(expr, context)?;
                        self.node_set(value, "a path")?
                    }
                };
                for step in steps {
                    items = self.step(&items, step)?;
                }
                Ok(XPathValue::NodeSet(items))
            }
            Expr::Filter { expr, predicates } => {
                let value = self.eval(expr, context)?;
                let mut items = self.node_set(value, "a predicate")?;
                for predicate in predicates {
                    items = self.filter(items, predicate)?;
                }
                Ok(XPathValue::NodeSet(items))
            }
            Expr::Union(left, right) => {
                let left = self.eval(left, context)?;
                let right = self.eval(right, context)?;
                let mut items = self.node_set(left, "'|'")?;
                items.extend(self.node_set(right, "'|'")?);
                Ok(XPathValue::NodeSet(self.document_order(items)))
            }
        }
    }

    fn node_set(&self, value: XPathValue, used_by: &str) -> Result<Vec<Item>, Error> {
        match value {
            XPathValue::NodeSet(items) => Ok(items),
            other => Err(Error::InvalidOperation(format!(
                "{} needs a node set, not {:?}",
                used_by, other
            ))),
        }
    }

    fn step(&self, items: &[Item], step: &Step) -> Result<Vec<Item>, Error> {
        let test = self.resolve_test(&step.test, step.axis)?;
        let mut result = Vec::new();
        for item in items {
            let mut selected = self
                .axis(*item, step.axis)
                .into_iter()
                .filter(|candidate| self.matches(*candidate, &test, step.axis))
                .collect::<Vec<_>>();
            for predicate in &step.predicates {
                selected = self.filter(selected, predicate)?;
            }
            result.extend(selected);
        }
        Ok(self.document_order(result))
    }

    fn filter(&self, items: Vec<Item>, predicate: &Expr) -> Result<Vec<Item>, Error> {
        let size = items.len();
        let mut kept = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            let context = Context {
                item,
                position: index + 1,
                size,
            };
            let keep = match self.eval(predicate, context)? {
                XPathValue::Number(number) => number == context.position as f64,
                other => self.boolean(&other),
            };
            if keep {
                kept.push(item);
            }
        }
        Ok(kept)
    }

    fn resolve_test<'t>(&self, test: &'t NodeTest, axis: Axis) -> Result<ResolvedTest<'t>, Error> {
        Ok(match test {
            NodeTest::Name { prefix, local } => {
                let namespace_id = match prefix {
                    Some(prefix) => self.bound_namespace(prefix)?,
                    None if axis == Axis::Attribute => Some(self.dom.no_namespace()),
                    None => match self.namespaces.get("") {
                        Some(namespace_id) => *namespace_id,
                        None => Some(self.dom.no_namespace()),
                    },
                };
                ResolvedTest::Name {
                    local,
                    namespace_id,
                }
            }
            NodeTest::PrefixWildcard(prefix) => {
                ResolvedTest::Namespace(self.bound_namespace(prefix)?)
            }
            NodeTest::Wildcard => ResolvedTest::Any,
            NodeTest::Node => ResolvedTest::Node,
            NodeTest::Text => ResolvedTest::Text,
            NodeTest::Comment => ResolvedTest::Comment,
            NodeTest::ProcessingInstruction(target) => {
                ResolvedTest::ProcessingInstruction(target.as_deref())
            }
        })
    }

    fn bound_namespace(&self, prefix: &str) -> Result<Option<NamespaceId>, Error> {
        match self.namespaces.get(prefix) {
            Some(namespace_id) if !prefix.is_empty() => Ok(*namespace_id),
            _ => Err(Error::UnknownPrefix(prefix.to_string())),
        }
    }

    fn matches(&self, item: Item, test: &ResolvedTest, axis: Axis) -> bool {
        // name tests select the principal node type of the axis
        let name_id = match item {
            Item::Attribute { name_id, .. } if axis == Axis::Attribute => Some(name_id),
            Item::Attribute { .. } => None,
            Item::Node(node) => self.dom.tag(node).map(|tag| tag.name()),
        };
        match test {
            ResolvedTest::Node => true,
            ResolvedTest::Text => matches!(item, Item::Node(node) if self.dom.is_text(node)),
            ResolvedTest::Comment => matches!(item, Item::Node(node) if self.dom.is_comment(node)),
            ResolvedTest::ProcessingInstruction(target) => match item {
                Item::Node(node) => match self.dom.processing_instruction(node) {
                    Some(pi) => target.map_or(true, |target| pi.target() == target),
                    None => false,
                },
                Item::Attribute { .. } => false,
            },
            ResolvedTest::Any => name_id.is_some(),
            ResolvedTest::Namespace(namespace_id) => name_id.is_some_and(|name_id| {
                Some(self.dom.namespace_for_name(name_id)) == *namespace_id
            }),
            ResolvedTest::Name {
                local,
                namespace_id,
            } => name_id.is_some_and(|name_id| {
                self.dom.local_name_str(name_id) == *local
                    && Some(self.dom.namespace_for_name(name_id)) == *namespace_id
            }),
        }
    }

    fn axis(&self, item: Item, axis: Axis) -> Vec<Item> {
        let arena = self.dom.arena();
        match item {
            Item::Node(node) => {
                let id = node.get();
                match axis {
                    Axis::Child => items(id.children(arena)),
                    Axis::Descendant => items(id.descendants(arena).skip(1)),
                    Axis::DescendantOrSelf => items(id.descendants(arena)),
                    Axis::Parent => items(id.ancestors(arena).skip(1).take(1)),
                    Axis::Ancestor => items(id.ancestors(arena).skip(1)),
                    Axis::AncestorOrSelf => items(id.ancestors(arena)),
                    Axis::FollowingSibling => items(id.following_siblings(arena).skip(1)),
                    Axis::PrecedingSibling => items(id.preceding_siblings(arena).skip(1)),
                    Axis::Following => self.following(node),
                    Axis::Preceding => self.preceding(node),
                    Axis::Attribute => match self.dom.tag(node) {
                        Some(tag) => tag
                            .attributes()
                            .iter()
                            .map(|(name_id, _)| Item::Attribute {
                                owner: node,
                                name_id: *name_id,
                            })
                            .collect(),
                        None => Vec::new(),
                    },
                    Axis::SelfAxis => vec![item],
                }
            }
            Item::Attribute { owner, .. } => match axis {
                Axis::Parent => vec![Item::Node(owner)],
                Axis::Ancestor => items(owner.get().ancestors(arena)),
                Axis::AncestorOrSelf => {
                    let mut result = vec![item];
                    result.extend(items(owner.get().ancestors(arena)));
                    result
                }
                Axis::SelfAxis => vec![item],
                Axis::Following => {
                    let mut result = items(owner.get().descendants(arena).skip(1));
                    result.extend(self.following(owner));
                    result
                }
                Axis::Preceding => self.preceding(owner),
                _ => Vec::new(),
            },
        }
    }

    fn following(&self, node: Node) -> Vec<Item> {
        let arena = self.dom.arena();
        let mut result = Vec::new();
        for ancestor in node.get().ancestors(arena) {
            for sibling in ancestor.following_siblings(arena).skip(1) {
                result.extend(items(sibling.descendants(arena)));
            }
        }
        result
    }

    /// Closest first, which is reverse document order.
    fn preceding(&self, node: Node) -> Vec<Item> {
        let arena = self.dom.arena();
        let mut result = Vec::new();
        for ancestor in node.get().ancestors(arena) {
            for sibling in ancestor.preceding_siblings(arena).skip(1) {
                let mut subtree = items(sibling.descendants(arena));
                subtree.reverse();
                result.extend(subtree);
            }
        }
        result
    }

    fn order(&self) -> &HashMap<Node, usize> {
        self.order.get_or_init(|| {
            self.dom
                .descendants(self.top)
                .enumerate()
                .map(|(index, node)| (node, index))
                .collect()
        })
    }

    fn order_key(&self, item: Item) -> (usize, usize) {
        let order = self.order();
        let position = |node: Node| order.get(&node).copied().unwrap_or(usize::MAX);
        match item {
            Item::Node(node) => (position(node), 0),
            Item::Attribute { owner, name_id } => {
                let index = self
                    .dom
                    .tag(owner)
                    .and_then(|tag| tag.attributes().iter().position(|(id, _)| *id == name_id))
                    .unwrap_or(0);
                (position(owner), index + 1)
            }
        }
    }

    fn document_order(&self, mut items: Vec<Item>) -> Vec<Item> {
        items.sort_by_cached_key(|item| self.order_key(*item));
        items.dedup();
        items
    }

    fn binary(
        &self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        context: Context,
    ) -> Result<XPathValue, Error> {
        match op {
            BinaryOp::Or => {
                let left = self.eval(left, context)?;
                if self.boolean(&left) {
                    return Ok(XPathValue::Boolean(true));
                }
                let right = self.eval(right, context)?;
                Ok(XPathValue::Boolean(self.boolean(&right)))
            }
            BinaryOp::And => {
                let left = self.eval(left, context)?;
                if !self.boolean(&left) {
                    return Ok(XPathValue::Boolean(false));
                }
                let right = self.eval(right, context)?;
                Ok(XPathValue::Boolean(self.boolean(&right)))
            }
            BinaryOp::Eq
            | BinaryOp::Neq
            | BinaryOp::Lt
            | BinaryOp::Lte
            | BinaryOp::Gt
            | BinaryOp::Gte => {
                let left = self.eval(left, context)?;
                let right = self.eval(right, context)?;
                Ok(XPathValue::Boolean(self.compare(op, &left, &right)))
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                let left = self.eval(left, context)?;
                let right = self.eval(right, context)?;
                let (a, b) = (self.number(&left), self.number(&right));
                Ok(XPathValue::Number(match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    _ => a % b,
                }))
            }
        }
    }

    fn compare(&self, op: BinaryOp, left: &XPathValue, right: &XPathValue) -> bool {
        match (left, right) {
            (XPathValue::NodeSet(left), XPathValue::NodeSet(right)) => {
                let right = right
                    .iter()
                    .map(|item| self.string_value(*item))
                    .collect::<Vec<_>>();
                left.iter().any(|item| {
                    let a = XPathValue::String(self.string_value(*item));
                    right
                        .iter()
                        .any(|b| compare_atomic(op, &a, &XPathValue::String(b.clone())))
                })
            }
            (XPathValue::NodeSet(items), XPathValue::Boolean(_)) => {
                compare_atomic(op, &XPathValue::Boolean(!items.is_empty()), right)
            }
            (XPathValue::Boolean(_), XPathValue::NodeSet(items)) => {
                compare_atomic(op, left, &XPathValue::Boolean(!items.is_empty()))
            }
            (XPathValue::NodeSet(items), _) => items.iter().any(|item| {
                compare_atomic(op, &XPathValue::String(self.string_value(*item)), right)
            }),
            (_, XPathValue::NodeSet(items)) => items.iter().any(|item| {
                compare_atomic(op, left, &XPathValue::String(self.string_value(*item)))
            }),
            _ => compare_atomic(op, left, right),
        }
    }

    fn string_value(&self, item: Item) -> String {
        match item {
            Item::Node(node) => self.dom.text_content(node),
            Item::Attribute { owner, name_id } => self
                .dom
                .tag(owner)
                .and_then(|tag| tag.get_attribute(name_id))
                .unwrap_or_default()
                .to_string(),
        }
    }

    fn string(&self, value: &XPathValue) -> String {
        match value {
            XPathValue::NodeSet(items) => items
                .first()
                .map(|item| self.string_value(*item))
                .unwrap_or_default(),
            XPathValue::Boolean(b) => b.to_string(),
            XPathValue::Number(n) => number_to_string(*n),
            XPathValue::String(s) => s.clone(),
        }
    }

    fn number(&self, value: &XPathValue) -> f64 {
        match value {
            XPathValue::Number(n) => *n,
            XPathValue::Boolean(b) => f64::from(u8::from(*b)),
            XPathValue::String(s) => string_to_number(s),
            XPathValue::NodeSet(_) => string_to_number(&self.string(value)),
        }
    }

    fn boolean(&self, value: &XPathValue) -> bool {
        match value {
            XPathValue::Boolean(b) => *b,
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::NodeSet(items) => !items.is_empty(),
        }
    }

    fn call(&self, name: &str, args: &[Expr], context: Context) -> Result<XPathValue, Error> {
        let (min, max) = arity(name).ok_or_else(|| Error::UnknownFunction(name.to_string()))?;
        if args.len() < min || max.is_some_and(|max| args.len() > max) {
            return Err(Error::FunctionArity(name.to_string(), args.len()));
        }
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg, context)?);
        }
        let string_arg = |index: usize| match values.get(index) {
            Some(value) => self.string(value),
            None => self.string_value(context.item),
        };
        let number_arg = |index: usize| values.get(index).map(|v| self.number(v)).unwrap_or(f64::NAN);
        Ok(match name {
            "last" => XPathValue::Number(context.size as f64),
            "position" => XPathValue::Number(context.position as f64),
            "count" => {
                let items = self.node_set(values[0].clone(), "count()")?;
                XPathValue::Number(items.len() as f64)
            }
            "local-name" | "namespace-uri" | "name" => {
                let item = match values.first().cloned() {
                    Some(value) => self.node_set(value, name)?.first().copied(),
                    None => Some(context.item),
                };
                let result = match item {
                    Some(item) => match name {
                        "local-name" => self.item_local_name(item),
                        "namespace-uri" => self.item_namespace_uri(item),
                        _ => self.item_name(item),
                    },
                    None => String::new(),
                };
                XPathValue::String(result)
            }
            "string" => XPathValue::String(string_arg(0)),
            "concat" => XPathValue::String(values.iter().map(|v| self.string(v)).collect()),
            "starts-with" => XPathValue::Boolean(string_arg(0).starts_with(&string_arg(1))),
            "contains" => XPathValue::Boolean(string_arg(0).contains(&string_arg(1))),
            "substring-before" => {
                let (s, pattern) = (string_arg(0), string_arg(1));
                XPathValue::String(
                    s.split_once(pattern.as_str())
                        .map(|(before, _)| before.to_string())
                        .unwrap_or_default(),
                )
            }
            "substring-after" => {
                let (s, pattern) = (string_arg(0), string_arg(1));
                XPathValue::String(
                    s.split_once(pattern.as_str())
                        .map(|(_, after)| after.to_string())
                        .unwrap_or_default(),
                )
            }
            "substring" => {
                let start = round(number_arg(1));
                let end = if values.len() > 2 {
                    start + round(number_arg(2))
                } else {
                    f64::INFINITY
                };
                XPathValue::String(
                    string_arg(0)
                        .chars()
                        .enumerate()
                        .filter(|(index, _)| {
                            let position = (index + 1) as f64;
                            position >= start && position < end
                        })
                        .map(|(_, c)| c)
                        .collect(),
                )
            }
            "string-length" => XPathValue::Number(string_arg(0).chars().count() as f64),
            "normalize-space" => XPathValue::String(
                string_arg(0)
                    .split_ascii_whitespace()
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            "translate" => {
                let from = string_arg(1).chars().collect::<Vec<_>>();
                let to = string_arg(2).chars().collect::<Vec<_>>();
                XPathValue::String(
                    string_arg(0)
                        .chars()
                        .filter_map(|c| match from.iter().position(|f| *f == c) {
                            Some(index) => to.get(index).copied(),
                            None => Some(c),
                        })
                        .collect(),
                )
            }
            "boolean" => XPathValue::Boolean(self.boolean(&values[0])),
            "not" => XPathValue::Boolean(!self.boolean(&values[0])),
            "true" => XPathValue::Boolean(true),
            "false" => XPathValue::Boolean(false),
            "number" => match values.first() {
                Some(value) => XPathValue::Number(self.number(value)),
                None => XPathValue::Number(string_to_number(&self.string_value(context.item))),
            },
            "sum" => {
                let items = self.node_set(values[0].clone(), "sum()")?;
                XPathValue::Number(
                    items
                        .iter()
                        .map(|item| string_to_number(&self.string_value(*item)))
                        .sum(),
                )
            }
            "floor" => XPathValue::Number(number_arg(0).floor()),
            "ceiling" => XPathValue::Number(number_arg(0).ceil()),
            "round" => XPathValue::Number(round(number_arg(0))),
            _ => return Err(Error::UnknownFunction(name.to_string())),
        })
    }

    fn item_name_id(&self, item: Item) -> Option<NameId> {
        match item {
            Item::Node(node) => self.dom.tag(node).map(|tag| tag.name()),
            Item::Attribute { name_id, .. } => Some(name_id),
        }
    }

    fn item_local_name(&self, item: Item) -> String {
        if let Item::Node(node) = item {
            if let Value::ProcessingInstruction(pi) = self.dom.value(node) {
                return pi.target().to_string();
            }
        }
        self.item_name_id(item)
            .map(|name_id| self.dom.local_name_str(name_id).to_string())
            .unwrap_or_default()
    }

    fn item_namespace_uri(&self, item: Item) -> String {
        match self.item_name_id(item) {
            Some(name_id) => {
                let namespace_id = self.dom.namespace_for_name(name_id);
                if namespace_id == self.dom.no_namespace() {
                    String::new()
                } else {
                    self.dom.namespace_str(namespace_id).to_string()
                }
            }
            None => String::new(),
        }
    }

    /// The name as it would be written, using the prefix in scope.
    ///
    /// Attributes never use the default namespace, so a namespaced
    /// attribute without a prefix in scope gets its Clark name.
    fn item_name(&self, item: Item) -> String {
        let local = self.item_local_name(item);
        let Some(name_id) = self.item_name_id(item) else {
            return local;
        };
        let namespace_id = self.dom.namespace_for_name(name_id);
        if namespace_id == self.dom.no_namespace() {
            return local;
        }
        if namespace_id == self.dom.xml_namespace() {
            return format!("xml:{}", local);
        }
        let node = item.node();
        let empty = self.dom.empty_prefix();
        let is_attribute = matches!(item, Item::Attribute { .. });
        if !is_attribute && self.dom.namespace_for_prefix(node, empty) == Some(namespace_id) {
            return local;
        }
        let prefix = self
            .dom
            .ancestors(node)
            .filter_map(|ancestor| self.dom.tag(ancestor))
            .flat_map(|tag| tag.prefixes().iter())
            .find(|(prefix_id, declared)| {
                **prefix_id != empty
                    && **declared == namespace_id
                    && self.dom.namespace_for_prefix(node, **prefix_id) == Some(namespace_id)
            })
            .map(|(prefix_id, _)| *prefix_id);
        match prefix {
            Some(prefix_id) => format!("{}:{}", self.dom.prefix_str(prefix_id), local),
            None if is_attribute => self.dom.clark_name(name_id),
            None => local,
        }
    }
}

fn items(nodes: impl Iterator<Item = NodeId>) -> Vec<Item> {
    nodes.map(|id| Item::Node(Node::new(id))).collect()
}

fn arity(name: &str) -> Option<(usize, Option<usize>)> {
    Some(match name {
        "last" | "position" | "true" | "false" => (0, Some(0)),
        "count" | "sum" | "boolean" | "not" | "floor" | "ceiling" | "round" => (1, Some(1)),
        "local-name" | "namespace-uri" | "name" | "string" | "string-length"
        | "normalize-space" | "number" => (0, Some(1)),
        "starts-with" | "contains" | "substring-before" | "substring-after" => (2, Some(2)),
        "substring" => (2, Some(3)),
        "translate" => (3, Some(3)),
        "concat" => (2, None),
        _ => return None,
    })
}

fn round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        n
    } else {
        (n + 0.5).floor()
    }
}

fn compare_atomic(op: BinaryOp, left: &XPathValue, right: &XPathValue) -> bool {
    let number = |value: &XPathValue| match value {
        XPathValue::Number(n) => *n,
        XPathValue::Boolean(b) => f64::from(u8::from(*b)),
        XPathValue::String(s) => string_to_number(s),
        XPathValue::NodeSet(_) => f64::NAN,
    };
    if op.is_relational() {
        let (a, b) = (number(left), number(right));
        return match op {
            BinaryOp::Lt => a < b,
            BinaryOp::Lte => a <= b,
            BinaryOp::Gt => a > b,
            _ => a >= b,
        };
    }
    let equal = match (left, right) {
        (XPathValue::Boolean(_), _) | (_, XPathValue::Boolean(_)) => {
            truthy(left) == truthy(right)
        }
        (XPathValue::Number(_), _) | (_, XPathValue::Number(_)) => number(left) == number(right),
        (XPathValue::String(a), XPathValue::String(b)) => a == b,
        _ => false,
    };
    if op == BinaryOp::Eq {
        equal
    } else {
        !equal
    }
}

fn truthy(value: &XPathValue) -> bool {
    match value {
        XPathValue::Boolean(b) => *b,
        XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
        XPathValue::String(s) => !s.is_empty(),
        XPathValue::NodeSet(items) => !items.is_empty(),
    }
}
