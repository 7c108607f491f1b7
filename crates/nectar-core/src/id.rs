use slotmap::new_key_type;

new_key_type! {
    /// Identifies a honey blob in the world's registry.
    ///
    /// Generational: a key held by an ant stops resolving once the blob is
    /// removed, even if its slot is later reused.
    pub struct HoneyId;

    /// Identifies an ant.
    pub struct AntId;
}
