use super::support::*;

#[tokio::test]
async fn feed_is_absent_when_following_nobody() {
    let world = World::new();
    let ann = world.walker("Ann").await;
    world.walker("Bob").await;
    world.sign_in("Ann").await;

    assert_eq!(world.service.count_following(Some(&ann)).await, 0);
    assert_eq!(world.service.get_feed().await, None);
    assert_eq!(world.service.try_get_feed().await.unwrap(), FeedOutcome::NoFollowees);
}

#[tokio::test]
async fn feed_is_empty_when_followees_have_not_posted() {
    let world = World::new();
    world.walker("Ann").await;
    let bob = world.walker("Bob").await;
    world.sign_in("Ann").await;
    assert!(world.service.follow(&bob).await);

    assert_eq!(world.service.get_feed().await, Some(Vec::new()));
}

#[tokio::test]
async fn feed_is_the_union_of_followee_posts() {
    let world = World::new();
    world.walker("Ann").await;
    let bob = world.walker("Bob").await;
    let cat = world.walker("Cat").await;
    world.walker("Dan").await;

    world.sign_in("Bob").await;
    let bob_posts = vec![world.share("bob 1", 30).await, world.share("bob 2", 20).await];
    world.sign_in("Cat").await;
    let cat_posts = vec![world.share("cat 1", 10).await];
    world.sign_in("Dan").await;
    world.share("dan 1", 5).await;

    world.sign_in("Ann").await;
    world.service.follow(&bob).await;
    world.service.follow(&cat).await;

    let feed = world.service.get_feed().await.expect("feed");
    assert_eq!(feed.len(), bob_posts.len() + cat_posts.len());
    for post in bob_posts.iter().chain(&cat_posts) {
        assert_eq!(feed.iter().filter(|candidate| *candidate == post).count(), 1);
    }
    assert!(feed.iter().all(|post| post.creator_id == bob || post.creator_id == cat));
}

#[tokio::test]
async fn following_twice_does_not_duplicate_the_feed() {
    let world = World::new();
    world.walker("Ann").await;
    let bob = world.walker("Bob").await;
    world.sign_in("Bob").await;
    world.share("only walk", 1).await;

    world.sign_in("Ann").await;
    world.service.follow(&bob).await;
    world.service.follow(&bob).await;

    assert_eq!(titles(&world.service.get_feed().await.unwrap()), vec!["only walk"]);
}

#[tokio::test]
async fn followee_ordering_groups_posts_newest_first() {
    let world = World::new();
    world.walker("Ann").await;
    let bob = world.walker("Bob").await;
    world.sign_in("Bob").await;
    world.share("old", 60).await;
    world.share("new", 1).await;
    world.share("middle", 30).await;

    world.sign_in("Ann").await;
    world.service.follow(&bob).await;
    assert_eq!(titles(&world.service.get_feed().await.unwrap()), vec!["new", "middle", "old"]);
}

#[tokio::test]
async fn recency_ordering_interleaves_followees() {
    let world = World::with_feed(FeedSettings {
        ordering: FeedOrdering::Recency,
        ..FeedSettings::default()
    });
    world.walker("Ann").await;
    let bob = world.walker("Bob").await;
    let cat = world.walker("Cat").await;
    world.sign_in("Bob").await;
    world.share("bob old", 50).await;
    world.share("bob new", 10).await;
    world.sign_in("Cat").await;
    world.share("cat mid", 30).await;

    world.sign_in("Ann").await;
    world.service.follow(&bob).await;
    world.service.follow(&cat).await;
    assert_eq!(
        titles(&world.service.get_feed().await.unwrap()),
        vec!["bob new", "cat mid", "bob old"]
    );
}

#[tokio::test]
async fn per_followee_limit_keeps_the_newest_posts() {
    let world = World::with_feed(FeedSettings {
        per_followee_limit: Some(2),
        ..FeedSettings::default()
    });
    world.walker("Ann").await;
    let bob = world.walker("Bob").await;
    world.sign_in("Bob").await;
    for minutes in [40, 30, 20, 10] {
        world.share(&format!("walk {minutes}"), minutes).await;
    }

    world.sign_in("Ann").await;
    world.service.follow(&bob).await;
    assert_eq!(titles(&world.service.get_feed().await.unwrap()), vec!["walk 10", "walk 20"]);
}

#[tokio::test]
async fn store_outage_yields_no_feed_at_all() {
    let world = World::new();
    world.walker("Ann").await;
    let bob = world.walker("Bob").await;
    world.sign_in("Bob").await;
    world.share("walk", 1).await;
    world.sign_in("Ann").await;
    world.service.follow(&bob).await;

    world.store.set_available(false);
    assert_eq!(world.service.get_feed().await, None);
    assert!(matches!(
        world.service.try_get_feed().await,
        Err(WalkError::StoreUnavailable(_))
    ));

    world.store.set_available(true);
    assert_eq!(world.service.get_feed().await.map(|posts| posts.len()), Some(1));
}

#[tokio::test]
async fn feed_needs_a_session() {
    let world = World::new();
    world.walker("Ann").await;
    assert_eq!(world.service.get_feed().await, None);
    assert!(matches!(world.service.try_get_feed().await, Err(WalkError::NoActiveSession)));
}

/// Store that answers every post query with each matching document twice.
struct RepeatedPostReads(MemoryStore);

impl DocumentStore for RepeatedPostReads {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.0.get(collection, id).await
    }

    async fn put(&self, collection: &str, id: DocumentId, fields: Map<String, Value>) -> Result<String, StoreError> {
        self.0.put(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.0.delete(collection, id).await
    }

    async fn query(&self, query: Query) -> Result<Vec<Document>, StoreError> {
        let repeat = query.collection == Post::COLLECTION;
        let documents = self.0.query(query).await?;
        if !repeat {
            return Ok(documents);
        }
        Ok(documents
            .into_iter()
            .flat_map(|document| [document.clone(), document])
            .collect())
    }
}

#[tokio::test]
async fn repeated_reads_of_a_post_appear_once_in_the_feed() {
    let world = World::new();
    world.walker("Ann").await;
    let bob = world.walker("Bob").await;
    world.sign_in("Bob").await;
    let first = world.share("first", 2).await;
    let second = world.share("second", 1).await;
    world.sign_in("Ann").await;
    world.service.follow(&bob).await;

    let service = Service::new(
        RepeatedPostReads(world.store.clone()),
        StoreIdentity::new(world.store.clone()),
        FeedSettings::default(),
    );
    assert!(service.authenticate(&email("Ann"), PASSWORD).await);

    let feed = service.get_feed().await.expect("feed");
    assert_eq!(feed, vec![second, first]);
}
