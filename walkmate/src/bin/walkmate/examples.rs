use crate::commands;

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

const FEED_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Read the feed",
    commands: &["walkmate feed", "walkmate feed --output compact"],
}];

const SEARCH_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Find people by name prefix",
    commands: &["walkmate search an", "walkmate search \"Ann\" --output json"],
}];

const DEMO_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Try it without a server",
    commands: &["walkmate demo", "walkmate demo --no-color"],
}];

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "signup",
            groups: commands::EXAMPLES,
        },
        CommandExample {
            name: "feed",
            groups: FEED_EXAMPLES,
        },
        CommandExample {
            name: "search",
            groups: SEARCH_EXAMPLES,
        },
        CommandExample {
            name: "demo",
            groups: DEMO_EXAMPLES,
        },
    ]
}
