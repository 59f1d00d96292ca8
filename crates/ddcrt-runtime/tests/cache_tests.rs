use super::*;

fn key(generic: u32, args: u32) -> TypeKey {
    TypeKey {
        generic: GenericId(generic),
        args: TypeListId(args),
    }
}

#[test]
fn test_get_counts_hits_and_misses() {
    let cache = InstantiationCache::new();
    assert_eq!(cache.get(&key(0, 1)), None);
    cache.insert(key(0, 1), TypeId(40));
    assert_eq!(cache.get(&key(0, 1)), Some(TypeId(40)));
    assert_eq!(cache.peek(&key(0, 1)), Some(TypeId(40)));

    let stats = cache.stats();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[test]
fn test_keys_distinguish_generic_and_args() {
    let cache = InstantiationCache::new();
    cache.insert(key(0, 1), TypeId(40));
    cache.insert(key(0, 2), TypeId(41));
    cache.insert(key(1, 1), TypeId(42));
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.peek(&key(1, 1)), Some(TypeId(42)));
}

#[test]
fn test_begin_build_detects_reentry() {
    let cache = InstantiationCache::new();
    let outer = cache.begin_build(key(0, 1)).expect("first build");
    assert_eq!(cache.build_depth(), 1);
    assert_eq!(cache.begin_build(key(0, 1)).err(), Some(BuildConflict::Cycle));
    {
        let _inner = cache.begin_build(key(0, 2)).expect("different key");
        assert_eq!(cache.build_depth(), 2);
    }
    assert_eq!(cache.build_depth(), 1);
    drop(outer);
    assert_eq!(cache.build_depth(), 0);
    assert!(cache.begin_build(key(0, 1)).is_ok());
}

#[test]
fn test_begin_build_depth_limit() {
    let cache = InstantiationCache::new();
    let scopes: Vec<_> = (0..MAX_INSTANTIATION_DEPTH)
        .map(|i| cache.begin_build(key(i, 1)).expect("within limit"))
        .collect();
    assert_eq!(
        cache.begin_build(key(u32::MAX, 1)).err(),
        Some(BuildConflict::TooDeep)
    );
    drop(scopes);
    assert_eq!(cache.build_depth(), 0);
}
