//! Overload selection by operand types.
//!
//! A `TypeTrie` maps type sequences to functions. Level 0 of a sequence is
//! the type of the top of the operand stack, level 1 the one below, and so on.
//! Each level of the trie is a chain of alternatives; a wildcard is always
//! the last alternative of its chain, so concrete types are tried first.
//! A sequence ends in a leaf, which is always the head of its chain.

use smallvec::SmallVec;

use crate::core::{Token, TypeSlot, TypeTag};
use crate::errors::SliError;
use crate::interp::TokenStack;
use crate::util::Appendable;

pub type TypeSequence = SmallVec<[TypeSlot; 4]>;

const INFO_WIDTH: usize = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeId(u32);

const ROOT: NodeId = NodeId(0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    /// Fresh chain head, not yet assigned.
    Empty,
    Type(TypeTag),
    Any,
    /// End of a sequence, holds the function.
    Leaf,
}

impl Slot {
    fn of(ty: TypeSlot) -> Self {
        match ty {
            TypeSlot::Is(tag) => Slot::Type(tag),
            TypeSlot::Any => Slot::Any,
        }
    }

    fn matches(self, tag: TypeTag) -> bool {
        match self {
            Slot::Type(t) => t == tag,
            Slot::Any => true,
            Slot::Empty | Slot::Leaf => false,
        }
    }
}

struct TypeNode {
    slot: Slot,
    next: Option<NodeId>,
    alt: Option<NodeId>,
    func: Token,
}

impl TypeNode {
    fn new(slot: Slot) -> Self {
        Self {
            slot,
            next: None,
            alt: None,
            func: Token::void(),
        }
    }
}

pub struct TypeTrie {
    nodes: Vec<TypeNode>,
}

impl TypeTrie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TypeNode::new(Slot::Empty)],
        }
    }

    fn node(&self, id: NodeId) -> &TypeNode {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut TypeNode {
        &mut self.nodes[id.0 as usize]
    }

    fn push_node(&mut self, slot: Slot) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(TypeNode::new(slot));
        id
    }

    /// Finds or creates the node for `ty` in the chain starting at `pos`.
    ///
    /// A wildcard met on the way hands its role over to a new node at the end
    /// of the chain and takes the requested type itself.
    fn get_alternative(&mut self, mut pos: NodeId, ty: TypeSlot) -> NodeId {
        let want = Slot::of(ty);
        if self.node(pos).slot == Slot::Empty {
            self.node_mut(pos).slot = want;
            return pos;
        }
        while self.node(pos).slot != want {
            let alt = match self.node(pos).alt {
                Some(alt) => alt,
                None => {
                    let alt = self.push_node(want);
                    self.node_mut(pos).alt = Some(alt);
                    alt
                }
            };
            if self.node(pos).slot == Slot::Any {
                debug_assert_eq!(self.node(alt).slot, want, "wildcard is not last in its chain");
                let node = self.node_mut(pos);
                let func = node.func.take();
                let next = node.next.take();
                node.slot = want;
                let tail = self.node_mut(alt);
                tail.slot = Slot::Any;
                tail.func = func;
                tail.next = next;
            } else {
                pos = alt;
            }
        }
        pos
    }

    /// Binds `func` to the type sequence `types` (level 0 first).
    ///
    /// Returns false, leaving the trie unchanged, if the sequence is already
    /// bound or is a proper prefix of a bound sequence.
    pub fn insert_move(&mut self, types: &[TypeSlot], func: Token) -> bool {
        assert!(!types.is_empty(), "an overload needs at least one operand type");
        let mut pos = ROOT;
        for &ty in types {
            pos = self.get_alternative(pos, ty);
            pos = match self.node(pos).next {
                Some(next) => next,
                None => {
                    let next = self.push_node(Slot::Empty);
                    self.node_mut(pos).next = Some(next);
                    next
                }
            };
        }
        match self.node(pos).slot {
            Slot::Empty => {
                let node = self.node_mut(pos);
                node.slot = Slot::Leaf;
                node.func = func;
                true
            }
            Slot::Leaf => {
                log::warn!("overload {} is already defined, ignored", describe(types));
                false
            }
            _ => {
                log::warn!(
                    "overload {} is a prefix of a longer overload, ignored",
                    describe(types)
                );
                false
            }
        }
    }

    pub fn insert(&mut self, types: &[TypeSlot], func: &Token) -> bool {
        self.insert_move(types, func.clone())
    }

    /// Selects the function for the operands on `stack`.
    ///
    /// The longest matching sequence wins. If nothing deeper matches, the
    /// longest sequence passed on the way down is used; without one the
    /// lookup fails with `ArgumentType` naming the offending level, or with
    /// `StackUnderflow` if the operands ran out first.
    pub fn lookup(&self, stack: &TokenStack) -> Result<&Token, SliError> {
        let load = stack.load();
        let mut pos = ROOT;
        let mut level = 0;
        let mut best = None;
        loop {
            let head = self.node(pos);
            if head.slot == Slot::Leaf {
                best = Some(&head.func);
            }
            if level >= load {
                return best.ok_or(SliError::underflow(level + 1, load));
            }
            let found = stack
                .pick(level)?
                .tag()
                .and_then(|tag| self.find_in_chain(pos, tag));
            match found.and_then(|id| self.node(id).next) {
                Some(next) => {
                    pos = next;
                    level += 1;
                }
                None => return best.ok_or(SliError::ArgumentType { level }),
            }
        }
    }

    fn find_in_chain(&self, head: NodeId, tag: TypeTag) -> Option<NodeId> {
        let mut cur = Some(head);
        while let Some(id) = cur {
            let node = self.node(id);
            if node.slot.matches(tag) {
                return Some(id);
            }
            cur = node.alt;
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.node(ROOT).slot == Slot::Empty
    }

    /// Decision table: one row per overload, deepest operand first.
    pub fn info(&self) -> String {
        let mut out = String::new();
        let mut path = Vec::new();
        if !self.is_empty() {
            self.info_rec(ROOT, &mut path, &mut out);
        }
        out
    }

    fn info_rec(&self, id: NodeId, path: &mut Vec<&'static str>, out: &mut String) {
        let node = self.node(id);
        match node.slot {
            Slot::Leaf => {
                for ty in path.iter().rev() {
                    out.append_padded(ty, INFO_WIDTH);
                }
                out.append_str("calls ");
                match node.func.datum() {
                    Some(d) => d.print(out),
                    None => out.push_str("<void>"),
                }
                out.push('\n');
            }
            Slot::Type(_) | Slot::Any => {
                path.push(match node.slot {
                    Slot::Type(t) => t.name(),
                    _ => TypeSlot::Any.name(),
                });
                if let Some(next) = node.next {
                    self.info_rec(next, path, out);
                }
                path.pop();
            }
            Slot::Empty => {}
        }
        if let Some(alt) = node.alt {
            self.info_rec(alt, path, out);
        }
    }

    /// Nested array form: a leaf becomes its function, a type node becomes
    /// `[/type next-chain]`, and a chain is the array of its alternatives.
    pub fn to_token_array(&self) -> Token {
        if self.is_empty() {
            return Token::array(Vec::new());
        }
        self.chain_to_token(ROOT)
    }

    fn chain_to_token(&self, head: NodeId) -> Token {
        let mut items = Vec::new();
        let mut cur = Some(head);
        while let Some(id) = cur {
            let node = self.node(id);
            match node.slot {
                Slot::Leaf => items.push(node.func.clone()),
                Slot::Type(_) | Slot::Any => {
                    let name = match node.slot {
                        Slot::Type(t) => t.name(),
                        _ => TypeSlot::Any.name(),
                    };
                    let next = match node.next {
                        Some(n) => self.chain_to_token(n),
                        None => Token::array(Vec::new()),
                    };
                    items.push(Token::array(vec![Token::literal(name), next]));
                }
                Slot::Empty => {}
            }
            cur = node.alt;
        }
        Token::array(items)
    }
}

impl Default for TypeTrie {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(types: &[TypeSlot]) -> String {
    let names: Vec<&str> = types.iter().rev().map(|t| t.name()).collect();
    format!("({})", names.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::interp::Interpreter;

    fn f_a(_: &mut Interpreter) -> Result<(), SliError> {
        Ok(())
    }

    fn func(name: &str) -> Token {
        Token::function(name, f_a)
    }

    fn called(t: &Token) -> String {
        match t.value() {
            Some(Value::Function(f)) => f.name().to_string(),
            _ => String::from("?"),
        }
    }

    fn stack(tokens: Vec<Token>) -> TokenStack {
        let mut s = TokenStack::new();
        for t in tokens {
            s.push(t);
        }
        s
    }

    const INT: TypeSlot = TypeSlot::Is(TypeTag::Integer);
    const DBL: TypeSlot = TypeSlot::Is(TypeTag::Double);

    #[test]
    fn wildcard_is_demoted_behind_concrete_types() {
        let mut trie = TypeTrie::new();
        assert!(trie.insert_move(&[TypeSlot::Any], func("any")));
        assert!(trie.insert_move(&[INT], func("int")));
        assert_eq!(called(trie.lookup(&stack(vec![Token::int(1)])).unwrap()), "int");
        assert_eq!(called(trie.lookup(&stack(vec![Token::mark()])).unwrap()), "any");
    }

    #[test]
    fn duplicates_keep_the_first_binding() {
        let mut trie = TypeTrie::new();
        assert!(trie.insert_move(&[INT, INT], func("first")));
        assert!(!trie.insert_move(&[INT, INT], func("second")));
        assert!(!trie.insert_move(&[INT], func("prefix")));
        let s = stack(vec![Token::int(1), Token::int(2)]);
        assert_eq!(called(trie.lookup(&s).unwrap()), "first");
    }

    #[test]
    fn shorter_sequence_serves_as_fallback() {
        let mut trie = TypeTrie::new();
        assert!(trie.insert_move(&[INT], func("one")));
        assert!(trie.insert_move(&[INT, DBL], func("two")));
        let s = stack(vec![Token::double(1.0), Token::int(2)]);
        assert_eq!(called(trie.lookup(&s).unwrap()), "two");
        let s = stack(vec![Token::string("x"), Token::int(2)]);
        assert_eq!(called(trie.lookup(&s).unwrap()), "one");
        let s = stack(vec![Token::int(2)]);
        assert_eq!(called(trie.lookup(&s).unwrap()), "one");
    }

    #[test]
    fn failures_name_the_level() {
        let mut trie = TypeTrie::new();
        trie.insert_move(&[INT, INT], func("add"));
        let s = stack(vec![Token::double(1.0), Token::int(2)]);
        assert_eq!(trie.lookup(&s).unwrap_err(), SliError::ArgumentType { level: 1 });
        let s = stack(vec![Token::int(2)]);
        assert_eq!(trie.lookup(&s).unwrap_err(), SliError::underflow(2, 1));
        let s = stack(vec![]);
        assert_eq!(trie.lookup(&s).unwrap_err(), SliError::underflow(1, 0));
    }

    #[test]
    fn info_lists_deepest_operand_first() {
        let mut trie = TypeTrie::new();
        trie.insert_move(&[DBL, INT], func("add_id"));
        let line = format!("{:<15}{:<15}calls -add_id-\n", "integertype", "doubletype");
        assert_eq!(trie.info(), line);
    }

    #[test]
    fn token_array_mirrors_the_trie() {
        let mut trie = TypeTrie::new();
        trie.insert_move(&[INT], func("f"));
        assert_eq!(trie.to_token_array().to_string(), "[[/integertype [-f-]]]");
    }
}
