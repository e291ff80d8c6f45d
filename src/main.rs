use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voxplay=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting voxplay demo");
    run()
}

#[cfg(feature = "audio-io")]
fn run() -> Result<()> {
    use std::io::{BufRead, Write};
    use voxplay::audio::AudioOutput;
    use voxplay::config::EngineConfig;
    use voxplay::playback::PlaybackEngine;
    use voxplay::synth::ToneSource;

    let config = EngineConfig::default();
    let mut engine = PlaybackEngine::new(config.clone())?;
    engine.set_source(Box::new(ToneSource::new(config.sample_rate)))?;

    let mut output = AudioOutput::new(engine.sample_rate())?;
    output.bind(&mut engine)?;

    let events = engine.events();
    std::thread::spawn(move || {
        for event in events {
            tracing::warn!("Playback event: {:?}", event);
        }
    });

    println!("Enter text to speak, 1 to pause, 2 to resume, 3 to stop, q to quit");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match line.trim() {
            "" => {}
            "q" => break,
            "1" => engine.pause(),
            "2" => engine.resume(),
            "3" => engine.stop(),
            text => engine.submit_text(text)?,
        }
    }

    engine.stop();
    output.close();
    info!("Demo finished");
    Ok(())
}

#[cfg(not(feature = "audio-io"))]
fn run() -> Result<()> {
    info!("Built without the audio-io feature; nothing to play");
    Ok(())
}
