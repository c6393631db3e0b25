//! Batch player search: chunking, re-planning, and result semantics.

use anyhow::Result;
use futures::TryStreamExt;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rl_stats::{Client, Platform, Player, PlaylistKey, RlError, TierBreakdown};

const TOKEN_PATH: &str = "/auth/token";

fn builder_for(server: &MockServer) -> rl_stats::ClientBuilder {
    Client::builder("test_client_id", "test_client_secret")
        .api_base(server.uri())
        .token_url(format!("{}{}", server.uri(), TOKEN_PATH))
        .steam_base(server.uri())
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "bearer",
            "access_token": "tok",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

fn record(user_id: &str, user_name: &str) -> serde_json::Value {
    json!({"user_id": user_id, "user_name": user_name})
}

fn ids(count: usize) -> Vec<String> {
    (0..count).map(|n| format!("id{n}")).collect()
}

async fn collect(client: &Client, platform: Platform, ids: Vec<String>) -> Result<Vec<Player>> {
    let players = client.get_players(platform, ids, Vec::<String>::new())?;
    Ok(players.try_collect().await?)
}

#[tokio::test]
async fn test_empty_query_is_rejected_up_front() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server).await;
    let client = builder_for(&server).build()?;

    let err = client
        .get_players(Platform::Steam, Vec::<String>::new(), Vec::<String>::new())
        .err()
        .expect("empty query must fail");
    assert!(matches!(err, RlError::EmptyQuery));
    Ok(())
}

#[tokio::test]
async fn test_empty_search_result_is_player_not_found() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/player/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = builder_for(&server).build()?;
    let err = client
        .get_player_by_id(Platform::Steam, "76561198012345678")
        .await
        .unwrap_err();
    assert!(matches!(err, RlError::PlayerNotFound(_)));

    let err = client
        .get_player_by_name(Platform::Ps4, "SomePlayer")
        .await
        .unwrap_err();
    assert!(matches!(err, RlError::PlayerNotFound(_)));
    Ok(())
}

#[tokio::test]
async fn test_results_arrive_across_chunks_with_omissions() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server).await;

    // 12 ids at the default limit of 10 means two chunks; the server only
    // knows three of the players and the rest are silently omitted
    Mock::given(method("GET"))
        .and(path("/player/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([record("1", "First"), record("2", "Second")])),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/player/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record("3", "Third")])))
        .expect(1)
        .mount(&server)
        .await;

    let client = builder_for(&server).build()?;
    let players = collect(&client, Platform::Epic, ids(12)).await?;
    let names: Vec<&str> = players.iter().map(|p| p.user_name.as_str()).collect();
    assert_eq!(names, ["First", "Second", "Third"]);
    Ok(())
}

#[tokio::test]
async fn test_400_over_limit_replans_remaining_entries() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server).await;

    // the first 10-entry chunk overflows a server limit of 5
    Mock::given(method("GET"))
        .and(path("/player/search"))
        .respond_with(
            ResponseTemplate::new(400)
                .insert_header("X-Search-Query-Limit", "5")
                .insert_header("X-Search-Query-Count", "10")
                .set_body_json(json!({"detail": "Player search over the query limit"})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    // all 25 entries re-chunked at 5 -> five more requests
    Mock::given(method("GET"))
        .and(path("/player/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([record("1", "Found")])))
        .expect(5)
        .mount(&server)
        .await;

    let client = builder_for(&server).build()?;
    let players = collect(&client, Platform::Epic, ids(25)).await?;
    // one record per re-planned chunk
    assert_eq!(players.len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_400_without_violation_headers_propagates() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/player/search"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Invalid platform"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = builder_for(&server).build()?;
    let err = collect(&client, Platform::Epic, ids(3))
        .await
        .unwrap_err()
        .downcast::<RlError>()?;
    match err {
        RlError::Http { status, message, .. } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(message, "Invalid platform");
        }
        other => panic!("expected RlError::Http, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_advertised_limit_raises_next_calls_chunk_size() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server).await;

    // every response advertises a limit of 50; the first call teaches the
    // client, so 60 ids then fit into two chunks instead of six
    Mock::given(method("GET"))
        .and(path("/player/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Search-Query-Limit", "50")
                .set_body_json(json!([record("1", "Found")])),
        )
        .expect(3)
        .mount(&server)
        .await;

    let client = builder_for(&server).build()?;
    collect(&client, Platform::Epic, ids(1)).await?;
    collect(&client, Platform::Epic, ids(60)).await?;
    Ok(())
}

#[tokio::test]
async fn test_tier_breakdown_feeds_playlist_estimates() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/player/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "user_id": "1",
            "user_name": "Estimated",
            "player_skills": [
                {"playlist": 13, "tier": 0, "division": 0, "mu": 30.0, "sigma": 4.0, "skill": 150},
                {"playlist": 99, "tier": 4, "division": 1, "mu": 20.0, "sigma": 4.0, "skill": 300}
            ]
        }])))
        .mount(&server)
        .await;

    let breakdown: TierBreakdown = serde_json::from_value(json!({
        "13": {"5": {"2": [100.0, 200.0]}}
    }))?;
    let client = builder_for(&server).tier_breakdown(breakdown).build()?;
    let player = client.get_player_by_id(Platform::Epic, "1").await?;

    let standard = player.get_playlist(PlaylistKey::Standard).unwrap();
    assert_eq!(standard.tier, 0);
    assert_eq!(standard.tier_estimates.tier, 5);
    assert_eq!(standard.tier_estimates.division, 2);

    // unknown playlist ids survive assembly
    assert_eq!(player.playlists[&99].tier, 4);
    Ok(())
}
