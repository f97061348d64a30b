use clap::Parser;
use secretion_data::Frame;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "frames.jsonl")]
    input: String,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize, Debug, PartialEq)]
struct Summary {
    frames: usize,
    last_tick: u64,
    total_secretions: u64,
    secretions_per_1000_ticks: f64,
    peak_docked: usize,
    peak_docked_tick: u64,
    mean_open_channels: f64,
    /// Distinct vesicles seen docked in any frame.
    vesicles_seen_docked: usize,
    /// Mean nucleus distance of the docked vesicles over all frames, Å.
    mean_docked_nucleus_distance: Option<f64>,
}

fn summarize(frames: &[Frame]) -> Option<Summary> {
    let last = &frames.last()?.stats;
    let peak = frames
        .iter()
        .map(|f| &f.stats)
        .max_by_key(|f| (f.docked, std::cmp::Reverse(f.tick)))?;
    let rate = if last.tick > 0 {
        last.total_secretions as f64 * 1000.0 / last.tick as f64
    } else {
        0.0
    };
    let open: usize = frames.iter().map(|f| f.stats.open_channels).sum();

    let mut seen = BTreeSet::new();
    let (mut distance, mut samples) = (0.0, 0usize);
    for v in frames.iter().flat_map(|f| &f.vesicles) {
        if v.docking != 0 {
            seen.insert(v.id);
            distance += v.nucleus_distance;
            samples += 1;
        }
    }
    Some(Summary {
        frames: frames.len(),
        last_tick: last.tick,
        total_secretions: last.total_secretions,
        secretions_per_1000_ticks: rate,
        peak_docked: peak.docked,
        peak_docked_tick: peak.tick,
        mean_open_channels: open as f64 / frames.len() as f64,
        vesicles_seen_docked: seen.len(),
        mean_docked_nucleus_distance: (samples > 0).then(|| distance / samples as f64),
    })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let reader = BufReader::new(File::open(&args.input)?);
    let mut frames = Vec::new();
    let mut skipped = 0;
    for l in reader.lines().map_while(Result::ok) {
        match serde_json::from_str::<Frame>(&l) {
            Ok(frame) => frames.push(frame),
            Err(_) => skipped += 1,
        }
    }

    let Some(summary) = summarize(&frames) else {
        println!("No frames found in {}. Nothing to analyze.", args.input);
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Secretion run summary ({})", args.input);
    println!("  Frames:                {}", summary.frames);
    if skipped > 0 {
        println!("  Unreadable lines:      {}", skipped);
    }
    println!("  Last tick:             {}", summary.last_tick);
    println!("  Total secretions:      {}", summary.total_secretions);
    println!(
        "  Secretions/1000 ticks: {:.3}",
        summary.secretions_per_1000_ticks
    );
    println!(
        "  Peak docked:           {} (tick {})",
        summary.peak_docked, summary.peak_docked_tick
    );
    println!("  Mean open channels:    {:.1}", summary.mean_open_channels);
    println!("  Vesicles seen docked:  {}", summary.vesicles_seen_docked);
    if let Some(d) = summary.mean_docked_nucleus_distance {
        println!("  Docked distance (Å):   {:.1}", d);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use secretion_data::{DVec3, EntityId, FrameStats, VesicleFrame};

    fn frame(tick: u64, total_secretions: u64, docked: usize, open_channels: usize) -> Frame {
        Frame {
            stats: FrameStats {
                tick,
                total_secretions,
                open_channels,
                docked,
                counting: 0,
                mean_maturation: 0.0,
                mean_nucleus_distance: 0.0,
            },
            vesicles: Vec::new(),
        }
    }

    fn vesicle(id: u32, distance: f64, docking: i64) -> VesicleFrame {
        VesicleFrame {
            id: EntityId(id),
            position: DVec3::new(distance, 0.0, 0.0),
            nucleus_distance: distance,
            maturation: 0,
            docking,
        }
    }

    #[test]
    fn test_args_parsing_defaults() {
        let args = Args::parse_from(["analyze"]);
        assert_eq!(args.input, "frames.jsonl");
        assert!(!args.json);
    }

    #[test]
    fn test_args_parsing_custom() {
        let args = Args::parse_from(["analyze", "-i", "run.jsonl", "--json"]);
        assert_eq!(args.input, "run.jsonl");
        assert!(args.json);
    }

    #[test]
    fn test_summary() {
        let frames = vec![
            frame(500, 1, 4, 3),
            frame(1000, 2, 7, 450),
            frame(1500, 3, 7, 3),
            frame(2000, 5, 2, 450),
        ];
        let s = summarize(&frames).unwrap();
        assert_eq!(s.frames, 4);
        assert_eq!(s.last_tick, 2000);
        assert_eq!(s.total_secretions, 5);
        assert!((s.secretions_per_1000_ticks - 2.5).abs() < 1e-12);
        assert_eq!(s.peak_docked, 7);
        assert_eq!(s.peak_docked_tick, 1000);
        assert!((s.mean_open_channels - 226.5).abs() < 1e-12);
        assert_eq!(s.vesicles_seen_docked, 0);
        assert_eq!(s.mean_docked_nucleus_distance, None);
    }

    #[test]
    fn test_summary_reads_vesicle_records() {
        let mut a = frame(10, 0, 1, 3);
        a.vesicles = vec![vesicle(0, 100.0, -1), vesicle(1, 50.0, 0)];
        let mut b = frame(20, 0, 2, 3);
        b.vesicles = vec![vesicle(0, 100.0, 1), vesicle(1, 160.0, -1)];
        let s = summarize(&[a, b]).unwrap();
        assert_eq!(s.vesicles_seen_docked, 2);
        assert_eq!(s.mean_docked_nucleus_distance, Some(120.0));
    }

    #[test]
    fn test_recorded_line_parses() {
        let line = r#"{"tick":5,"total_secretions":1,"open_channels":3,"docked":1,"counting":0,"mean_maturation":0.5,"mean_nucleus_distance":2500.0,"vesicles":[{"id":7,"position":[2500.0,0.0,0.0],"nucleus_distance":2500.0,"maturation":1,"docking":-1}]}"#;
        let frame: Frame = serde_json::from_str(line).unwrap();
        assert_eq!(frame.stats.tick, 5);
        assert_eq!(frame.vesicles[0].id, EntityId(7));
        assert_eq!(summarize(&[frame]).unwrap().vesicles_seen_docked, 1);
    }

    #[test]
    fn test_empty_input_has_no_summary() {
        assert_eq!(summarize(&[]), None);
    }
}
