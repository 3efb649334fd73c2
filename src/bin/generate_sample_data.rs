use yatube::{
    config::Config,
    data_seeder::{seed_sample_data, SAMPLE_PASSWORD},
    infrastructure::BlogDatabase,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("yatube=info")),
        )
        .init();

    let config = Config::from_env()?;
    println!("Generating sample data in {}", config.database.url);

    if let Some(parent) = config
        .database
        .url
        .strip_prefix("sqlite:")
        .map(|path| std::path::Path::new(path.trim_start_matches("//")))
        .and_then(|path| path.parent())
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let db = BlogDatabase::connect(&config.database.url).await?;
    db.init().await?;

    let summary = seed_sample_data(&db).await?;
    println!("  authors:  {}", summary.authors);
    println!("  groups:   {}", summary.groups);
    println!("  posts:    {}", summary.posts);
    println!("  comments: {}", summary.comments);
    println!("  follows:  {}", summary.follows);
    println!("Every sample author logs in with the password '{}'", SAMPLE_PASSWORD);

    Ok(())
}
