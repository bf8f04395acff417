/// Assert that no key is live twice in a namespace of the host's store
#[macro_export]
macro_rules! assert_keys_unique {
    ($store:expr, $namespace:expr) => {
        let mut seen = std::collections::HashSet::new();
        for lease in $store.leases(&$namespace) {
            assert!(
                seen.insert(lease.id()),
                "Key {} is leased twice in namespace {:?}",
                lease.id(),
                $namespace
            );
        }
    };
}

/// Assert that every given key is live and confirmed in a namespace
#[macro_export]
macro_rules! assert_keys_confirmed {
    ($store:expr, $namespace:expr, $keys:expr) => {
        for key in $keys.iter() {
            let lease = $store
                .lease(&$namespace, key)
                .unwrap_or_else(|| panic!("Key {} is not leased in {:?}", key, $namespace));
            assert!(
                lease.is_confirmed(),
                "Key {} in {:?} is leased but not confirmed",
                key,
                $namespace
            );
        }
    };
}
