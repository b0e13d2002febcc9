//! Feeds synthesized voice PCM through a bridge and drains the result
//! from a channel sink, with a mid-stream format change and a volume
//! adjustment along the way.
//!
//! Run with: cargo run --example bridge_loop

use std::sync::Arc;
use std::time::Duration;

use voice_bridge::streaming::{MockPeerSink, MockStreamer, MockStreaming};
use voice_bridge::{
    event_callback, AudioControl, ChannelSink, StaticVoiceConfig, StreamFormat, VoiceBridge,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,voice_bridge=debug".into()),
        )
        .init();

    // In-memory subsystem standing in for a real streaming backend.
    let peer_sink = Arc::new(MockPeerSink::new());
    let streamer = Arc::new(MockStreamer::new("demo"));
    streamer.set_unassigned_sink(peer_sink.clone());
    let streaming = Arc::new(MockStreaming::new());
    streaming.add_streamer(streamer);

    let (sink, mut rx) = ChannelSink::new(32);
    let sink = Arc::new(sink);

    let bridge = VoiceBridge::builder()
        .streaming(streaming)
        .voice_config(Arc::new(StaticVoiceConfig::new(StreamFormat::new(48000, 2))))
        .sink(sink.clone())
        .on_event(event_callback(|event| {
            tracing::info!(?event, "bridge event");
        }))
        .build()?;
    bridge.start()?;

    // Producer thread: 10ms blocks of a 440Hz tone, stereo at 48kHz
    // for the first half, then mono at 24kHz.
    let producer = std::thread::spawn({
        let peer_sink = peer_sink.clone();
        move || {
            let mut phase = 0.0f32;
            for i in 0..100u32 {
                let (rate, channels) = if i < 50 { (48000u32, 2u16) } else { (24000, 1) };
                let frames = rate as usize / 100;
                let mut samples = Vec::with_capacity(frames * usize::from(channels));
                for _ in 0..frames {
                    let value = (phase.sin() * 12000.0) as i16;
                    phase += 440.0 * std::f32::consts::TAU / rate as f32;
                    samples.extend(std::iter::repeat(value).take(usize::from(channels)));
                }
                peer_sink.push_pcm(&samples, rate, channels, frames);
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    });

    // Drain converted blocks as they arrive.
    let consumer = tokio::spawn(async move {
        let mut blocks = 0u64;
        let mut peak = 0.0f32;
        while let Some(block) = rx.recv().await {
            blocks += 1;
            for &sample in block.samples.iter() {
                peak = peak.max(sample.abs());
            }
            if blocks % 25 == 0 {
                tracing::info!(blocks, format = %block.format, peak, "draining");
            }
        }
        (blocks, peak)
    });

    // Halve the volume a quarter of the way in.
    let control = tokio::spawn({
        let bridge = bridge.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            bridge.set_volume(0.5);
            tracing::info!("volume halved");
        }
    });

    control.await?;
    tokio::task::spawn_blocking(move || producer.join())
        .await?
        .map_err(|_| "producer thread panicked")?;

    bridge.stop();
    tracing::info!(stats = ?bridge.stats(), dropped = sink.dropped_blocks(), "bridge done");

    // The drain task finishes once every handle on the channel sink is
    // gone and the channel runs dry.
    drop(bridge);
    drop(sink);
    let (blocks, peak) = consumer.await?;
    tracing::info!(blocks, peak, "drained");

    Ok(())
}
