use proptest::prelude::*;
use sli_runtime::{Interpreter, SliError, Token, TokenStack, TypeSlot, TypeTag, TypeTrie, Value};

const TAGS: [TypeTag; 3] = [TypeTag::Integer, TypeTag::Double, TypeTag::String];

fn noop(_: &mut Interpreter) -> Result<(), SliError> {
    Ok(())
}

fn sample(tag: TypeTag) -> Token {
    match tag {
        TypeTag::Integer => Token::int(1),
        TypeTag::Double => Token::double(1.0),
        _ => Token::string("s"),
    }
}

/// Operand stack holding exactly `sig`, level 0 on top.
fn stack_for(sig: &[TypeTag]) -> TokenStack {
    let mut s = TokenStack::new();
    for tag in sig.iter().rev() {
        s.push(sample(*tag));
    }
    s
}

fn bound_name(trie: &TypeTrie, stack: &TokenStack) -> Result<String, SliError> {
    match trie.lookup(stack)?.value() {
        Some(Value::Function(f)) => Ok(f.name().to_string()),
        _ => Ok(String::new()),
    }
}

fn signature() -> impl Strategy<Value = Vec<TypeTag>> {
    prop::collection::vec(prop::sample::select(TAGS.to_vec()), 1..4)
}

proptest! {
    #[test]
    fn every_accepted_signature_resolves_to_its_function(
        sigs in prop::collection::vec(signature(), 1..12),
    ) {
        let mut trie = TypeTrie::new();
        let mut accepted = Vec::new();
        for (i, sig) in sigs.iter().enumerate() {
            let slots: Vec<TypeSlot> = sig.iter().map(|t| TypeSlot::Is(*t)).collect();
            if trie.insert_move(&slots, Token::function(format!("f{i}"), noop)) {
                accepted.push((sig.clone(), format!("f{i}")));
            }
        }
        prop_assert!(!accepted.is_empty());
        for (sig, name) in &accepted {
            prop_assert_eq!(bound_name(&trie, &stack_for(sig)), Ok(name.clone()));
        }
    }
}

proptest! {
    #[test]
    fn extended_stacks_resolve_to_the_longest_accepted_prefix(
        sigs in prop::collection::vec(signature(), 1..12),
        tail in prop::collection::vec(prop::sample::select(TAGS.to_vec()), 0..3),
    ) {
        let mut trie = TypeTrie::new();
        let mut accepted = Vec::new();
        for (i, sig) in sigs.iter().enumerate() {
            let slots: Vec<TypeSlot> = sig.iter().map(|t| TypeSlot::Is(*t)).collect();
            if trie.insert_move(&slots, Token::function(format!("f{i}"), noop)) {
                accepted.push((sig.clone(), format!("f{i}")));
            }
        }
        for (sig, _) in &accepted {
            let mut operands = sig.clone();
            operands.extend_from_slice(&tail);
            let expected = accepted
                .iter()
                .filter(|(other, _)| operands.starts_with(other))
                .max_by_key(|(other, _)| other.len())
                .map(|(_, name)| name.clone());
            prop_assert_eq!(bound_name(&trie, &stack_for(&operands)).ok(), expected);
        }
    }
}

proptest! {
    #[test]
    fn repeated_insertion_changes_nothing(sigs in prop::collection::vec(signature(), 1..8)) {
        let mut trie = TypeTrie::new();
        for (i, sig) in sigs.iter().enumerate() {
            let slots: Vec<TypeSlot> = sig.iter().map(|t| TypeSlot::Is(*t)).collect();
            trie.insert_move(&slots, Token::function(format!("f{i}"), noop));
        }
        let before: Vec<_> = sigs.iter().map(|s| bound_name(&trie, &stack_for(s))).collect();
        let info = trie.info();
        for sig in &sigs {
            let slots: Vec<TypeSlot> = sig.iter().map(|t| TypeSlot::Is(*t)).collect();
            prop_assert!(!trie.insert_move(&slots, Token::function("again", noop)));
        }
        let after: Vec<_> = sigs.iter().map(|s| bound_name(&trie, &stack_for(s))).collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(info, trie.info());
    }
}

proptest! {
    #[test]
    fn late_wildcard_catches_uncovered_types(concrete in prop::sample::subsequence(TAGS.to_vec(), 0..3)) {
        let mut trie = TypeTrie::new();
        for tag in &concrete {
            trie.insert_move(&[TypeSlot::Is(*tag)], Token::function(tag.name(), noop));
        }
        trie.insert_move(&[TypeSlot::Any], Token::function("any", noop));
        for tag in TAGS {
            let expected = if concrete.contains(&tag) { tag.name() } else { "any" };
            prop_assert_eq!(bound_name(&trie, &stack_for(&[tag])), Ok(expected.to_string()));
        }
        let mut marks = TokenStack::new();
        marks.push(Token::mark());
        prop_assert_eq!(bound_name(&trie, &marks), Ok("any".to_string()));
    }
}

#[test]
fn depth_decides_between_one_and_two_operands() {
    let mut trie = TypeTrie::new();
    let int = TypeSlot::Is(TypeTag::Integer);
    assert!(trie.insert_move(&[int], Token::function("one", noop)));
    assert!(trie.insert_move(&[int, int], Token::function("two", noop)));
    assert_eq!(bound_name(&trie, &stack_for(&[TypeTag::Integer])), Ok("one".into()));
    assert_eq!(
        bound_name(&trie, &stack_for(&[TypeTag::Integer, TypeTag::Integer])),
        Ok("two".into())
    );
    assert_eq!(
        bound_name(&trie, &stack_for(&[TypeTag::Integer, TypeTag::Double])),
        Ok("one".into())
    );
}

#[test]
fn unmatched_operand_reports_its_level() {
    let mut trie = TypeTrie::new();
    let int = TypeSlot::Is(TypeTag::Integer);
    let dbl = TypeSlot::Is(TypeTag::Double);
    trie.insert_move(&[int, int, int], Token::function("three", noop));
    trie.insert_move(&[dbl], Token::function("d", noop));
    let stack = stack_for(&[TypeTag::Integer, TypeTag::Integer, TypeTag::String]);
    assert_eq!(bound_name(&trie, &stack), Err(SliError::ArgumentType { level: 2 }));
    let stack = stack_for(&[TypeTag::String]);
    assert_eq!(bound_name(&trie, &stack), Err(SliError::ArgumentType { level: 0 }));
    let stack = stack_for(&[TypeTag::Integer, TypeTag::Integer]);
    assert_eq!(bound_name(&trie, &stack), Err(SliError::underflow(3, 2)));
}

#[test]
fn shorter_overload_two_levels_up_still_applies() {
    let mut trie = TypeTrie::new();
    let int = TypeSlot::Is(TypeTag::Integer);
    assert!(trie.insert_move(&[int], Token::function("one", noop)));
    assert!(trie.insert_move(&[int, int, int], Token::function("three", noop)));
    let ints = |n| stack_for(&vec![TypeTag::Integer; n]);
    assert_eq!(bound_name(&trie, &ints(1)), Ok("one".into()));
    assert_eq!(bound_name(&trie, &ints(2)), Ok("one".into()));
    assert_eq!(bound_name(&trie, &ints(3)), Ok("three".into()));
    let stack = stack_for(&[TypeTag::Integer, TypeTag::Integer, TypeTag::String]);
    assert_eq!(bound_name(&trie, &stack), Ok("one".into()));
    assert_eq!(bound_name(&trie, &TokenStack::new()), Err(SliError::underflow(1, 0)));
}
