//! randwave CLI: real-time player for randomly generated wavetables.
//!
//! Audio runs on the cpal callback thread through a handoff `Voice`; this thread
//! owns the `Regenerator` and rebuilds the table when a `generate <size> <points>`
//! line arrives on stdin.

mod control;

use std::io::BufRead;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use randwave_engine::handoff::{self, Regenerator, Voice};
use randwave_engine::{
    ControlPointSet, Engine, GenerateParams, PointSource, Reconstruction, SeededSource,
    DEFAULT_BLOCK_SIZE,
};

use control::{parse_command, Command};

#[derive(Parser, Debug)]
#[command(name = "randwave")]
#[command(about = "Play a random, smoothly interpolated wavetable and regenerate it live")]
#[command(version)]
struct Args {
    /// List output devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Output device name (default device if omitted)
    #[arg(long)]
    device: Option<String>,

    /// Requested sample rate in Hz
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Requested channel count
    #[arg(long)]
    channels: Option<u16>,

    /// Stop after this many seconds
    #[arg(long)]
    duration: Option<u64>,

    /// Wavetable size in samples; invalid values fall back to 2048
    #[arg(long, default_value_t = 2048.0, allow_negative_numbers = true)]
    size: f64,

    /// Interior control points; invalid values fall back to 4
    #[arg(long, default_value_t = 4.0, allow_negative_numbers = true)]
    points: f64,

    /// Seed for reproducible waveforms
    #[arg(long)]
    seed: Option<u64>,

    /// Render block size; one block plays one wavetable period
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    /// Output gain
    #[arg(long, default_value_t = 0.35)]
    gain: f32,

    /// Reconstruction used between control points
    #[arg(long, value_enum, default_value_t = Mode::CardinalSum)]
    mode: Mode,

    /// Print control points after every generate
    #[arg(long)]
    print_points: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Mode {
    CardinalSum,
    Nodal,
}

impl From<Mode> for Reconstruction {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Nodal => Reconstruction::Nodal,
            Mode::CardinalSum => Reconstruction::CardinalSum,
        }
    }
}

fn list_output_devices() -> Result<()> {
    let host = cpal::default_host();
    println!("Available output devices:");
    for dev in host.output_devices()? {
        println!("- {}", dev.name()?);
    }
    Ok(())
}

fn pick_device(name: Option<&str>) -> Result<cpal::Device> {
    let host = cpal::default_host();
    if let Some(name) = name {
        for d in host.output_devices()? {
            if d.name()? == name {
                return Ok(d);
            }
        }
        bail!("requested device not found: {name}");
    }
    host.default_output_device().context("no default output device")
}

fn choose_config(
    device: &cpal::Device,
    req_sr: Option<u32>,
    req_ch: Option<u16>,
) -> Result<cpal::SupportedStreamConfig> {
    if req_sr.is_none() && req_ch.is_none() {
        return Ok(device.default_output_config()?);
    }

    // Closest range: sample-rate distance dominates, channel distance breaks ties.
    let mut best: Option<(u64, cpal::SupportedStreamConfigRange)> = None;
    for range in device.supported_output_configs()? {
        let sr_min = range.min_sample_rate().0;
        let sr_max = range.max_sample_rate().0;

        let ch_pen = req_ch.map_or(0, |c| u64::from(range.channels().abs_diff(c)));
        let sr_pen = req_sr.map_or(0, |sr| {
            if (sr_min..=sr_max).contains(&sr) {
                0
            } else {
                u64::from(sr_min.abs_diff(sr).min(sr_max.abs_diff(sr)))
            }
        });

        let score = sr_pen.saturating_mul(1000) + ch_pen;
        if best.as_ref().map_or(true, |(s, _)| score < *s) {
            best = Some((score, range));
        }
    }

    let (_, range) = best.ok_or_else(|| anyhow!("no supported output configs"))?;
    let sr = pick_rate(req_sr, range.min_sample_rate().0, range.max_sample_rate().0);
    Ok(range.with_sample_rate(cpal::SampleRate(sr)))
}

/// Requested rate clamped into `lo..=hi`, or `hi` when nothing was asked for.
fn pick_rate(req: Option<u32>, lo: u32, hi: u32) -> u32 {
    req.map_or(hi, |sr| sr.clamp(lo, hi))
}

fn build_stream<T>(
    device: &cpal::Device,
    cfg: &cpal::StreamConfig,
    mut engine: Engine<Voice>,
    gain: f32,
    peak: Arc<AtomicU32>,
) -> Result<cpal::Stream>
where
    T: cpal::Sample + cpal::FromSample<f32> + cpal::SizedSample + Send + 'static,
{
    let channels = usize::from(cfg.channels).max(1);

    let stream = device.build_output_stream(
        cfg,
        move |output: &mut [T], _| {
            let mut block_peak = 0.0f32;
            for frame in output.chunks_mut(channels) {
                let s = (engine.next() * gain).clamp(-1.0, 1.0);
                block_peak = block_peak.max(s.abs());
                let v: T = T::from_sample(s);
                frame.fill(v);
            }
            // Non-negative f32 bit patterns order like the values they encode.
            peak.fetch_max(block_peak.to_bits(), Ordering::Relaxed);
        },
        |e| log::error!("stream error: {e}"),
        None,
    )?;

    Ok(stream)
}

fn print_points(points: &ControlPointSet) {
    println!("control points ({}):", points.len());
    for p in points.iter() {
        println!("  {:>7}  {:+.6}", p.position, p.amplitude);
    }
}

fn regenerate<S: PointSource>(regen: &mut Regenerator<S>, size: f64, points: f64, show: bool) {
    // Fallback warnings are logged by the engine.
    match regen.generate_raw(size, points) {
        Ok(_) => {
            if show {
                print_points(regen.last_points());
            }
        }
        Err(e) => log::error!("generate failed: {e}"),
    }
}

fn read_commands(tx: Sender<Command>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        match parse_command(&line) {
            Ok(Some(cmd)) => {
                let quit = cmd == Command::Quit;
                if tx.send(cmd).is_err() || quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("{e:#}"),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list_devices {
        return list_output_devices();
    }

    let source = args.seed.map_or_else(SeededSource::from_entropy, SeededSource::seeded);
    let (mut regen, voice) = handoff::channel(source, args.mode.into())
        .context("building the initial wavetable")?;

    let defaults = GenerateParams::default();
    #[allow(clippy::float_cmp)]
    let custom = args.size != defaults.wavetable_size() as f64
        || args.points != defaults.interior_points() as f64;
    if custom {
        regenerate(&mut regen, args.size, args.points, false);
    }
    if args.print_points {
        print_points(regen.last_points());
    }

    let device = pick_device(args.device.as_deref())?;
    let sup_cfg = choose_config(&device, args.sample_rate, args.channels)?;
    let sample_format = sup_cfg.sample_format();
    // The device may not offer exactly what was asked for; play what it does offer.
    let cfg = sup_cfg.config();
    if args.sample_rate.is_some_and(|sr| sr != cfg.sample_rate.0)
        || args.channels.is_some_and(|ch| ch != cfg.channels)
    {
        log::warn!(
            "requested {:?} Hz / {:?} ch, using {} Hz / {} ch",
            args.sample_rate,
            args.channels,
            cfg.sample_rate.0,
            cfg.channels
        );
    }

    log::info!("device: {}", device.name()?);
    log::info!("stream config: {cfg:?} (sample format {sample_format:?})");
    log::info!(
        "block size {} -> one period every {:.2} ms",
        args.block_size.max(1),
        1000.0 * args.block_size.max(1) as f64 / f64::from(cfg.sample_rate.0)
    );

    let engine = Engine::with_block_size(voice, args.block_size);
    let peak = Arc::new(AtomicU32::new(0));

    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &cfg, engine, args.gain, peak.clone())?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &cfg, engine, args.gain, peak.clone())?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &cfg, engine, args.gain, peak.clone())?,
        other => bail!("unsupported device sample format: {other:?}"),
    };
    stream.play()?;

    println!("Type `generate <size> <points>` to regenerate, `quit` to stop.");

    let (cmd_tx, cmd_rx) = unbounded();
    thread::spawn(move || read_commands(cmd_tx));
    run(&mut regen, cmd_rx, &peak, args.duration, args.print_points);

    Ok(())
}

fn run<S: PointSource>(
    regen: &mut Regenerator<S>,
    commands: Receiver<Command>,
    peak: &AtomicU32,
    duration: Option<u64>,
    show_points: bool,
) {
    const METER: Duration = Duration::from_secs(1);
    let deadline = duration.map(|d| Instant::now() + Duration::from_secs(d));
    let mut next_meter = Instant::now() + METER;
    let mut stdin_open = true;

    loop {
        let wait = next_meter.saturating_duration_since(Instant::now());
        let msg = if stdin_open {
            commands.recv_timeout(wait)
        } else {
            thread::sleep(wait);
            Err(RecvTimeoutError::Timeout)
        };

        match msg {
            Ok(Command::Generate { size, points }) => regenerate(regen, size, points, show_points),
            Ok(Command::Quit) => break,
            Err(RecvTimeoutError::Disconnected) => {
                // Keep playing until the deadline, or until Ctrl+C.
                if deadline.is_none() {
                    log::info!("stdin closed; press Ctrl+C to stop");
                }
                stdin_open = false;
            }
            Err(RecvTimeoutError::Timeout) => {
                let p = f32::from_bits(peak.swap(0, Ordering::Relaxed));
                log::debug!("peak ~ {p:.3}");
                regen.collect_retired();
                next_meter += METER;
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_rate_is_clamped_to_the_range() {
        assert_eq!(pick_rate(Some(192_000), 44_100, 48_000), 48_000);
        assert_eq!(pick_rate(Some(8_000), 44_100, 48_000), 44_100);
        assert_eq!(pick_rate(Some(44_100), 44_100, 48_000), 44_100);
        assert_eq!(pick_rate(None, 44_100, 48_000), 48_000);
    }

    #[test]
    fn modes_map_onto_reconstruction() {
        let args = Args::parse_from(["randwave"]);
        assert_eq!(Reconstruction::from(args.mode), Reconstruction::CardinalSum);
        let args = Args::parse_from(["randwave", "--mode", "nodal"]);
        assert_eq!(Reconstruction::from(args.mode), Reconstruction::Nodal);
    }
}
