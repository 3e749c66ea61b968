use std::sync::Arc;

use downhill::config::Config;
use downhill::game::{Collaborators, GameStateController};
use downhill::headless::{parse_script, HeadlessHost, ScriptAction};
use downhill::hud::{ThreatBand, ThreatGauge};
use downhill::track::DecorScroller;

const DT: f32 = 0.05;

fn frames(host: &HeadlessHost, decor: &mut DecorScroller, gauge: &mut ThreatGauge, n: usize) {
    for _ in 0..n {
        let scaled = DT * host.time_scale();
        decor.tick(scaled);
        gauge.tick(scaled);
    }
}

#[test]
fn pause_freezes_scaled_tick_helpers() {
    let config = Config::default();
    let host = Arc::new(HeadlessHost::new());
    let controller =
        GameStateController::from_config(Collaborators::new().with_host(host.clone()), &config);
    let mut decor = DecorScroller::new(10.0, 1000.0);
    let mut gauge = ThreatGauge::new(config.threat.clone());
    gauge.set_threat(95.0);
    assert_eq!(gauge.band(), ThreatBand::Critical);

    controller.start_new_game();
    frames(&host, &mut decor, &mut gauge, 10); // 0.5s
    let moving = decor.offset();
    assert!((moving - 5.0).abs() < 1e-3);

    controller.pause_game();
    let visible = gauge.is_visible();
    frames(&host, &mut decor, &mut gauge, 40);
    assert_eq!(decor.offset(), moving);
    assert_eq!(gauge.is_visible(), visible);

    controller.resume_game();
    frames(&host, &mut decor, &mut gauge, 10);
    assert!(decor.offset() > moving);
}

#[test]
fn scripted_session_quits_through_host() {
    let mut config = Config::default();
    config.game.run_mode = downhill::config::RunMode::Harness;
    let host = Arc::new(HeadlessHost::new());
    let controller =
        GameStateController::from_config(Collaborators::new().with_host(host.clone()), &config);

    let script = parse_script("new,pause,resume,over,quit").unwrap();
    for action in &script {
        action.apply(&controller);
        if *action == ScriptAction::Resume {
            assert_eq!(host.time_scale(), 1.0);
        }
    }
    assert!(host.is_halted());
    assert!(!host.is_terminated());
    assert!(host.should_stop());
}

#[test]
fn set_action_drives_raw_state_change() {
    let config = Config::default();
    let host = Arc::new(HeadlessHost::new());
    let controller =
        GameStateController::from_config(Collaborators::new().with_host(host.clone()), &config);

    for action in &parse_script("new,set:paused").unwrap() {
        action.apply(&controller);
    }
    assert_eq!(controller.current_state(), downhill::game::GameState::Paused);
    assert_eq!(host.time_scale(), 0.0);
}
