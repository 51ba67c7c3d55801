/// Assert the ids of the messages a test server received, in order
#[macro_export]
macro_rules! assert_received_ids {
    ($messages:expr, [$($id:expr),* $(,)?]) => {
        let ids: Vec<u16> = $messages.iter().map(|message| message.id).collect();
        assert_eq!(ids, vec![$($id),*], "unexpected messages from the client");
    };
}

/// Assert that an entity exists in the client's scene
#[macro_export]
macro_rules! assert_has_entity {
    ($client:expr, $entity_id:expr) => {
        assert!(
            $client.scene().contains($entity_id),
            "entity {} missing from the client scene",
            $entity_id
        );
    };
}
