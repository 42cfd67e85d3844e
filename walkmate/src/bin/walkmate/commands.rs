use anyhow::{Result, bail};
use clap::Args;
use log::debug;
use walkmate::{
    DocumentStore, FeedOutcome, FeedSettings, GeoPoint, IdentityProvider, MemoryStore, Post, Service, StoreIdentity, User,
    WalkError,
};

use crate::{
    Commands,
    examples::ExampleGroup,
    output::{OutputManager, PostList, Profile, UserList},
    session::{SavedSession, SessionFile},
};

pub type CliService<S> = Service<S, StoreIdentity<S>>;

#[derive(Args, Debug)]
pub struct SignupArgs {
    /// Account email
    #[arg(long)]
    pub email: String,
    /// Account password (at least 6 characters)
    #[arg(long, env = "WALKMATE_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Display name
    #[arg(long)]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "WALKMATE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct PostArgs {
    /// Title of the walk
    #[arg(long)]
    pub title: String,
    /// Where it happened, as `latitude,longitude`
    #[arg(long = "at", value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub location: GeoPoint,
}

#[derive(Args, Debug)]
pub struct UserArg {
    /// User id; defaults to the signed-in user
    #[arg(long)]
    pub user: Option<String>,
}

#[derive(Args, Debug)]
pub struct TargetArg {
    /// Id of the other user
    pub user_id: String,
}

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Get started",
        commands: &[
            "walkmate signup --email ann@example.com --name Ann",
            "walkmate login --email ann@example.com",
        ],
    },
    ExampleGroup {
        title: "Share and read walks",
        commands: &[
            "walkmate post --title \"Retiro loop\" --at 40.4153,-3.6845",
            "walkmate follow <USER_ID>",
            "walkmate feed --output json",
        ],
    },
];

pub async fn dispatch<S>(
    command: Commands,
    service: &CliService<S>,
    session_file: &SessionFile,
    output: &OutputManager,
) -> Result<()>
where
    S: DocumentStore + Clone,
{
    match command {
        Commands::Signup(args) => handle_signup(args, service, session_file, output).await,
        Commands::Login(args) => handle_login(args, service, session_file, output).await,
        Commands::Logout => handle_logout(service, session_file, output).await,
        Commands::Whoami => handle_stats(UserArg { user: None }, service, output).await,
        Commands::Post(args) => handle_post(args, service, output).await,
        Commands::Posts(args) => handle_posts(args, service, output).await,
        Commands::DeletePost { post_id } => handle_delete_post(&post_id, service, output).await,
        Commands::Follow(target) => handle_follow(target, service, output).await,
        Commands::Unfollow(target) => handle_unfollow(target, service, output).await,
        Commands::IsFollowing(target) => handle_is_following(target, service, output).await,
        Commands::Stats(args) => handle_stats(args, service, output).await,
        Commands::Feed => handle_feed(service, output).await,
        Commands::Search { query } => handle_search(&query, service, output).await,
        Commands::Demo => bail!("demo runs on its own store"),
    }
}

/// Reopens the saved session, dropping the file when its token is no longer valid.
pub async fn resume_saved_session<S>(
    service: &CliService<S>,
    session_file: &SessionFile,
    output: &OutputManager,
) -> Result<()>
where
    S: DocumentStore + Clone,
{
    let Some(saved) = session_file.load()? else {
        return Ok(());
    };
    match service.try_resume_session(&saved.token).await {
        Ok(user_id) => debug!("resumed session for {user_id}"),
        Err(WalkError::StoreUnavailable(err)) => bail!("Could not reach the store: {err}"),
        Err(err) => {
            debug!("discarding saved session {}: {err}", session_file.path().display());
            session_file.clear()?;
            output.warning("Your session has expired. Please log in again.");
        }
    }
    Ok(())
}

fn require_session<S>(service: &CliService<S>) -> Result<()>
where
    S: DocumentStore + Clone,
{
    if !service.is_session_active() {
        bail!("Not signed in. Run `walkmate login` first.");
    }
    Ok(())
}

fn persist_session<S>(service: &CliService<S>, session_file: &SessionFile) -> Result<()>
where
    S: DocumentStore + Clone,
{
    let state = service.identity().session();
    if let (Some(user_id), Some(token)) = (state.user_id(), state.token()) {
        session_file.save(&SavedSession {
            token: token.to_string(),
            user_id: user_id.to_string(),
        })?;
    }
    Ok(())
}

async fn handle_signup<S>(
    args: SignupArgs,
    service: &CliService<S>,
    session_file: &SessionFile,
    output: &OutputManager,
) -> Result<()>
where
    S: DocumentStore + Clone,
{
    let Some(user) = service
        .create_user(&args.email, &args.password, User::new(args.name))
        .await
    else {
        bail!("Could not create the account. Check the email and password, or try logging in.");
    };

    if service.authenticate(&args.email, &args.password).await {
        persist_session(service, session_file)?;
    }
    output.success(&format!("Welcome, {}!", user.name));
    output.key_value("User id", &user.id);
    Ok(())
}

async fn handle_login<S>(
    args: LoginArgs,
    service: &CliService<S>,
    session_file: &SessionFile,
    output: &OutputManager,
) -> Result<()>
where
    S: DocumentStore + Clone,
{
    if service.is_session_active() && !service.log_out().await {
        bail!("Something went wrong while ending the previous session.");
    }
    if !service.authenticate(&args.email, &args.password).await {
        bail!("Invalid email or password.");
    }
    persist_session(service, session_file)?;
    output.success(&format!("Signed in as {}", args.email));
    Ok(())
}

async fn handle_logout<S>(service: &CliService<S>, session_file: &SessionFile, output: &OutputManager) -> Result<()>
where
    S: DocumentStore + Clone,
{
    if service.is_session_active() && !service.log_out().await {
        bail!("Something went wrong while signing out.");
    }
    session_file.clear()?;
    output.success("Signed out");
    Ok(())
}

async fn handle_post<S>(args: PostArgs, service: &CliService<S>, output: &OutputManager) -> Result<()>
where
    S: DocumentStore + Clone,
{
    require_session(service)?;
    if !service.create_post(Post::draft(args.title, "", args.location)).await {
        bail!("Something went wrong while sharing your walk.");
    }
    output.success("Walk shared");
    Ok(())
}

async fn handle_posts<S>(args: UserArg, service: &CliService<S>, output: &OutputManager) -> Result<()>
where
    S: DocumentStore + Clone,
{
    require_session(service)?;
    let Some(posts) = service.list_posts(args.user.as_deref()).await else {
        bail!("Something went wrong while loading posts.");
    };
    if posts.is_empty() {
        output.info("No walks yet");
        return Ok(());
    }
    output.display(&PostList(posts))
}

async fn handle_delete_post<S>(post_id: &str, service: &CliService<S>, output: &OutputManager) -> Result<()>
where
    S: DocumentStore + Clone,
{
    require_session(service)?;
    let mut post = Post::draft("", "", GeoPoint::new(0.0, 0.0));
    post.id = post_id.to_string();
    if !service.delete_post(&post).await {
        bail!("Could not delete post {post_id}.");
    }
    output.success(&format!("Deleted post {post_id}"));
    Ok(())
}

async fn handle_follow<S>(target: TargetArg, service: &CliService<S>, output: &OutputManager) -> Result<()>
where
    S: DocumentStore + Clone,
{
    require_session(service)?;
    if !service.follow(&target.user_id).await {
        bail!("Something went wrong while following {}.", target.user_id);
    }
    output.success(&format!("Following {}", target.user_id));
    Ok(())
}

async fn handle_unfollow<S>(target: TargetArg, service: &CliService<S>, output: &OutputManager) -> Result<()>
where
    S: DocumentStore + Clone,
{
    require_session(service)?;
    if !service.unfollow(&target.user_id).await {
        bail!("Something went wrong while unfollowing {}.", target.user_id);
    }
    output.success(&format!("No longer following {}", target.user_id));
    Ok(())
}

async fn handle_is_following<S>(target: TargetArg, service: &CliService<S>, output: &OutputManager) -> Result<()>
where
    S: DocumentStore + Clone,
{
    require_session(service)?;
    let following = service.is_following(&target.user_id).await;
    output.key_value(&format!("Following {}", target.user_id), if following { "yes" } else { "no" });
    Ok(())
}

async fn handle_stats<S>(args: UserArg, service: &CliService<S>, output: &OutputManager) -> Result<()>
where
    S: DocumentStore + Clone,
{
    require_session(service)?;
    let user_id = args.user.as_deref();
    let Some(user) = service.resolve_user(user_id).await else {
        bail!("User not found.");
    };
    let stats = service.user_stats(Some(&user.id)).await;
    output.display(&Profile { user, stats })
}

async fn handle_feed<S>(service: &CliService<S>, output: &OutputManager) -> Result<()>
where
    S: DocumentStore + Clone,
{
    require_session(service)?;
    match service.try_get_feed().await {
        Ok(FeedOutcome::NoFollowees) => {
            output.info("You are not following anyone yet. Use `walkmate search` to find people.");
            Ok(())
        }
        Ok(FeedOutcome::Posts(posts)) if posts.is_empty() => {
            output.info("The people you follow have not shared any walks yet");
            Ok(())
        }
        Ok(FeedOutcome::Posts(posts)) => output.display(&PostList(posts)),
        Err(err) => {
            debug!("feed failed: {err}");
            bail!("Something went wrong while loading your feed.")
        }
    }
}

async fn handle_search<S>(query: &str, service: &CliService<S>, output: &OutputManager) -> Result<()>
where
    S: DocumentStore + Clone,
{
    require_session(service)?;
    let users = service.search_other_users(query).await;
    if users.is_empty() {
        output.info(&format!("No users match \"{query}\""));
        return Ok(());
    }
    output.display(&UserList(users))
}

/// Seeds a throwaway in-memory store with three walkers and prints Ann's feed.
pub async fn handle_demo(feed: FeedSettings, output: &OutputManager) -> Result<()> {
    let store = MemoryStore::new();
    let service = Service::new(store.clone(), StoreIdentity::new(store), feed);

    let walkers = [
        ("ann@example.com", "Ann", "Retiro loop", GeoPoint::new(40.4153, -3.6845)),
        ("bob@example.com", "Bob", "Casa de Campo", GeoPoint::new(40.4194, -3.7473)),
        ("cat@example.com", "Cat", "Madrid Río", GeoPoint::new(40.4010, -3.7190)),
    ];
    let mut ids = Vec::new();
    for (email, name, title, location) in walkers {
        let Some(user) = service.create_user(email, "walkmate", User::new(name)).await else {
            bail!("Something went wrong while seeding {name}.");
        };
        if !service.authenticate(email, "walkmate").await {
            bail!("Something went wrong while signing in as {name}.");
        }
        if !service.create_post(Post::draft(title, "", location)).await {
            bail!("Something went wrong while sharing {name}'s walk.");
        }
        if !service.log_out().await {
            bail!("Something went wrong while signing {name} out.");
        }
        ids.push(user.id);
    }

    if !service.authenticate("ann@example.com", "walkmate").await {
        bail!("Something went wrong while signing in as Ann.");
    }
    output.heading("Ann before following anyone");
    if service.get_feed().await.is_none() {
        output.info("You are not following anyone yet");
    }

    for followee in &ids[1..] {
        if !service.follow(followee).await {
            bail!("Something went wrong while following {followee}.");
        }
    }
    let stats = service.user_stats(None).await;
    output.heading("Ann's feed");
    output.key_value("Following", &stats.following.to_string());
    match service.get_feed().await {
        Some(posts) => {
            for post in &posts {
                output.bullet(&format!("{} at {}", post.title, post.location));
            }
            Ok(())
        }
        None => bail!("Something went wrong while loading the demo feed."),
    }
}
