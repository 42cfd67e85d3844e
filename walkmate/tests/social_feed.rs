#[path = "social_feed/feed_tests.rs"]
mod feed_tests;
#[path = "social_feed/graph_tests.rs"]
mod graph_tests;
#[path = "social_feed/post_tests.rs"]
mod post_tests;
#[path = "social_feed/support.rs"]
mod support;
#[path = "social_feed/user_tests.rs"]
mod user_tests;
