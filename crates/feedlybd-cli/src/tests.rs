use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["feedlybd"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_fetch_with_defaults() {
    let cli = Cli::try_parse_from(["feedlybd", "fetch", "https://www.prothomalo.com/feed/"])
        .expect("expected valid cli args");
    match cli.command {
        Some(Commands::Fetch {
            url,
            title,
            id,
            json,
        }) => {
            assert_eq!(url, "https://www.prothomalo.com/feed/");
            assert_eq!(title, "");
            assert_eq!(id, "adhoc");
            assert!(!json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_aggregate_defaults() {
    let cli = Cli::try_parse_from(["feedlybd", "aggregate"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Aggregate {
            folder: None,
            feed: None,
            window: TimeWindow::All,
            query: None,
            limit: 50,
            json: false,
        })
    ));
}

#[test]
fn parses_aggregate_with_window_and_query() {
    let cli = Cli::try_parse_from([
        "feedlybd",
        "aggregate",
        "--folder",
        "national",
        "--window",
        "7days",
        "--query",
        "\"padma bridge\" -cricket",
        "--limit",
        "5",
    ])
    .expect("expected valid cli args");
    match cli.command {
        Some(Commands::Aggregate {
            folder,
            window,
            query,
            limit,
            ..
        }) => {
            assert_eq!(folder.as_deref(), Some("national"));
            assert_eq!(window, TimeWindow::LastDays(7));
            assert_eq!(query.as_deref(), Some("\"padma bridge\" -cricket"));
            assert_eq!(limit, 5);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn rejects_unknown_window() {
    assert!(Cli::try_parse_from(["feedlybd", "aggregate", "--window", "fortnight"]).is_err());
}

#[test]
fn folder_and_feed_conflict() {
    assert!(Cli::try_parse_from([
        "feedlybd",
        "aggregate",
        "--folder",
        "national",
        "--feed",
        "prothomalo",
    ])
    .is_err());
}

#[test]
fn summarize_requires_feed() {
    assert!(Cli::try_parse_from(["feedlybd", "summarize"]).is_err());

    let cli = Cli::try_parse_from(["feedlybd", "summarize", "--feed", "bbcbangla", "--index", "3"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Summarize { ref feed, index: 3, prompt: None }) if feed == "bbcbangla"
    ));
}

#[test]
fn parses_feeds_command() {
    let cli = Cli::try_parse_from(["feedlybd", "feeds"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Feeds)));
}
