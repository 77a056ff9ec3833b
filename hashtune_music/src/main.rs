// Hashtune CLI entry point.
//
// Generates one composition per input hash and writes them all into a
// single multi-track Standard MIDI File: melodies on one channel, chord
// accompaniment on another.
//
// Usage:
//   cargo run -p hashtune_music -- [output.mid] [HASH...]
//     [--tempo BPM] [--json PATH] [--summary]
//
// With no hashes on the command line a built-in demo set is used.

use hashtune_music::melody::Melody;
use hashtune_music::midi::write_midi;
use hashtune_music::note::pitch_name;
use std::path::Path;

/// Demo seeds used when no hashes are given.
const DEMO_HASHES: [&str; 5] = [
    "00000000000000000003efccdd987dd6d93ba18327eef8fd4b46d0de863eb14c",
    "000000000000000000051f8864b8eddf483e7d2b941d626ecea1de70fa0bf551",
    "0000000000000000000e760a04fc958a0631d47490b5f111d0d6aca418b9df17",
    "00000000000000000011f9866ca32fbbbb3cfba26af498dcd98c0f013a920021",
    "00000000000000000013f43456fe2e94a0760eaf779912e0fa37dfb64fe4ccdc",
];

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let tempo: u16 = parse_flag(&args, "--tempo").unwrap_or(120);
    let json_path: Option<String> = parse_flag(&args, "--json");
    let show_summary = args.iter().any(|a| a == "--summary");

    let positional = positional_args(&args);
    let output_path = positional
        .first()
        .map(|s| s.as_str())
        .unwrap_or("t.mid");
    let hashes: Vec<&str> = if positional.len() > 1 {
        positional[1..].iter().map(|s| s.as_str()).collect()
    } else {
        DEMO_HASHES.to_vec()
    };

    println!("=== Hashtune Generator ===");
    println!("Output: {output_path}");
    println!("Tempo: {tempo} BPM");
    println!("Hashes: {}", hashes.len());
    println!();

    println!("[1/3] Generating compositions...");
    let mut melodies: Vec<Melody> = hashes.iter().map(|h| Melody::from_hash(h)).collect();
    for (hash, melody) in hashes.iter().zip(&melodies) {
        println!(
            "  {}: {}/{} in {} {:?}, {} notes",
            short(hash),
            melody.time_signature.numerator,
            melody.time_signature.denominator,
            pitch_name(melody.key.scale),
            melody.key.mode,
            melody.notes.len(),
        );
    }

    println!("[2/3] Writing MIDI to {output_path}...");
    match write_midi(&mut melodies, Path::new(output_path), tempo) {
        Ok(()) => {
            let total: u32 = melodies.iter().map(|m| m.measures).sum();
            println!(
                "  Done. {} compositions, {} measures total.",
                melodies.len(),
                total
            );
        }
        Err(e) => {
            eprintln!("  Error writing MIDI: {e}");
            std::process::exit(1);
        }
    }

    if let Some(path) = &json_path {
        println!("[3/3] Exporting JSON to {path}...");
        match export_json(&melodies, Path::new(path)) {
            Ok(()) => println!("  Done."),
            Err(e) => {
                eprintln!("  Error writing JSON: {e}");
                std::process::exit(1);
            }
        }
    } else {
        println!("[3/3] No JSON export requested.");
    }

    if show_summary {
        for (hash, melody) in hashes.iter().zip(&melodies) {
            println!();
            println!("{}:", short(hash));
            print!("{}", melody.summary());
        }
    }

    println!();
    println!("Play with: timidity {output_path} (or any MIDI player)");
}

fn export_json(melodies: &[Melody], path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = serde_json::to_string_pretty(melodies)?;
    std::fs::write(path, data)?;
    Ok(())
}

/// First 12 characters of a hash, enough to tell the demo seeds apart.
fn short(hash: &str) -> &str {
    match hash.char_indices().nth(12) {
        Some((end, _)) => &hash[..end],
        None => hash,
    }
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

/// Arguments that are neither flags nor flag values.
fn positional_args(args: &[String]) -> Vec<&String> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if arg == "--summary" {
            i += 1;
        } else if arg.starts_with("--") {
            i += 2; // skip the flag and its value
        } else {
            out.push(arg);
            i += 1;
        }
    }
    out
}
