use std::env;

use anyhow::{Context, anyhow};
use compose_test::{demo, names, screen};
use recompose_ui::{HeadlessHost, HostConfig};

const DEFAULT_DEMO: &str = "animate_decay_demo";
const DEFAULT_FRAMES: usize = 180;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let name = env::var("COMPOSE_TEST_DEMO").unwrap_or_else(|_| DEFAULT_DEMO.to_string());
    let frames = match env::var("COMPOSE_TEST_FRAMES") {
        Ok(v) => v
            .parse::<usize>()
            .with_context(|| format!("COMPOSE_TEST_FRAMES={v:?} is not a frame count"))?,
        Err(_) => DEFAULT_FRAMES,
    };
    let content = demo(&name).ok_or_else(|| {
        anyhow!(
            "unknown demo '{name}', expected one of: {}",
            names().collect::<Vec<_>>().join(", ")
        )
    })?;

    let mut host = HeadlessHost::new(HostConfig::default());
    log::info!(
        "mounting {name} at {}x{} px, density {}",
        host.config.size.0,
        host.config.size.1,
        host.config.density
    );
    host.mount(screen(content));
    for i in 1..=frames {
        let frame = host.frame();
        log::trace!("frame {i}: {} hit regions", frame.hit_regions.len());
    }

    if let Some(layout) = host.layout() {
        print!("{}", layout.dump());
    }
    log::info!("{name}: {frames} frames, texts {:?}", host.texts());
    Ok(())
}
