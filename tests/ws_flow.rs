//! End-to-end event contract over a real WebSocket

mod support;

use serde_json::json;
use support::{connect, eventually, next_json, next_of_type, send_json, spawn_server};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn init_then_snapshots_then_disconnect() {
    let (addr, state) = spawn_server().await;
    let mut client = connect(addr).await;

    send_json(
        &mut client,
        json!({
            "type": "init",
            "window": { "width": 800, "height": 600 },
            "username": "ada",
            "color": "#1F1A70"
        }),
    )
    .await;

    let id = next_json(&mut client).await;
    assert_eq!(id["type"], "id");
    let player_id = id["id"].as_str().unwrap().to_string();

    let initialized = next_json(&mut client).await;
    assert_eq!(initialized["type"], "initalized");
    assert_eq!(initialized["username"], "ada");

    let snapshot = next_of_type(&mut client, "game-state").await;
    let players = snapshot["players"].as_array().unwrap();
    assert_eq!(players.len(), 1);
    let me = &players[0];
    assert_eq!(me["id"], player_id.as_str());
    assert_eq!(me["name"], "ada");
    assert_eq!(me["color"], "#1F1A70");
    assert_eq!(me["lives"], 3);
    assert_eq!(me["playing"], true);
    assert!(me["bullets"].as_array().unwrap().is_empty());

    client.close(None).await.unwrap();

    let world = state.world.clone();
    let scheduler = state.scheduler.clone();
    assert!(eventually(|| world.player_count() == 0).await);
    assert!(eventually(|| scheduler.scheduled() == 0).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_messages_do_not_end_the_session() {
    let (addr, _state) = spawn_server().await;
    let mut client = connect(addr).await;

    send_json(&mut client, json!({ "type": "teleport", "x": 3 })).await;
    send_json(&mut client, json!({ "type": "mousemove", "x": "left" })).await;
    send_json(&mut client, json!({ "type": "init" })).await;

    assert_eq!(next_json(&mut client).await["type"], "id");
    let initialized = next_json(&mut client).await;
    assert_eq!(initialized["username"], "Unnamed");

    let snapshot = next_of_type(&mut client, "game-state").await;
    assert_eq!(snapshot["players"][0]["color"], "#DB488B");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn players_see_each_other_and_firing_spawns_bullets() {
    let (addr, _state) = spawn_server().await;
    let mut first = connect(addr).await;
    let mut second = connect(addr).await;

    send_json(&mut first, json!({ "type": "init", "username": "a" })).await;
    next_of_type(&mut first, "initalized").await;
    send_json(&mut second, json!({ "type": "init", "username": "b" })).await;
    next_of_type(&mut second, "initalized").await;

    send_json(&mut first, json!({ "type": "mousemove", "x": 0.0, "y": 0.0 })).await;
    send_json(&mut first, json!({ "type": "mousedown" })).await;

    // The second session's view shows both players and the first one's bullets
    let mut saw_bullet = false;
    for _ in 0..120 {
        let snapshot = next_of_type(&mut second, "game-state").await;
        let players = snapshot["players"].as_array().unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0]["name"], "a");
        assert_eq!(players[1]["name"], "b");
        if !players[0]["bullets"].as_array().unwrap().is_empty() {
            saw_bullet = true;
            break;
        }
    }
    assert!(saw_bullet);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn aim_flood_settles_on_the_last_point() {
    let (addr, state) = spawn_server().await;
    let mut client = connect(addr).await;

    send_json(&mut client, json!({ "type": "init", "username": "ada" })).await;
    let id = next_json(&mut client).await["id"]
        .as_str()
        .unwrap()
        .parse::<uuid::Uuid>()
        .unwrap();
    next_of_type(&mut client, "initalized").await;

    for i in 0..300 {
        let v = f64::from(i) / 1000.0;
        send_json(&mut client, json!({ "type": "mousemove", "x": v, "y": v })).await;
    }
    send_json(&mut client, json!({ "type": "mousemove", "x": 0.9, "y": 0.1 })).await;

    let world = state.world.clone();
    assert!(
        eventually(|| world
            .lock()
            .get(id)
            .map(|player| player.aim == (0.9, 0.1))
            .unwrap_or(false))
        .await
    );
}
