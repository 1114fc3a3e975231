//! Build script for cadence-firmware
//!
//! - Sets up linker search paths for memory.x and the runtime link scripts
//! - Validates board.toml at compile time
//! - Emits the validated board description as Rust constants, plus a
//!   `board_pins!` macro that takes the GPIO lines the board uses

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Channels in one ADC scan pass
const SCAN_CHANNELS: usize = 5;

/// Highest ADC1 input multiplexer channel
const MAX_ADC_CHANNEL: i64 = 18;

/// Sample times the converter supports, in ADC clock cycles
const SAMPLE_CYCLES: [(i64, &str); 8] = [
    (3, "Cycles3"),
    (15, "Cycles15"),
    (28, "Cycles28"),
    (56, "Cycles56"),
    (84, "Cycles84"),
    (112, "Cycles112"),
    (144, "Cycles144"),
    (480, "Cycles480"),
];

/// Highest SYSCLK the F405 is rated for
const MAX_SYSCLK_HZ: i64 = 168_000_000;

/// APB1 and APB2 ceilings
const MAX_PCLK1_HZ: i64 = 42_000_000;
const MAX_PCLK2_HZ: i64 = 84_000_000;

fn main() {
    setup_linker();
    let board = validate_config();
    generate_config(&board);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Board description after validation
struct Board {
    clock: [i64; 4],
    led_data: (char, i64),
    status_led: (char, i64),
    timing: [i64; 6],
    channels: Vec<i64>,
    sample_time: &'static str,
    period_ms: i64,
    palette_shift: u32,
}

/// Validate board.toml configuration at compile time
fn validate_config() -> Board {
    // Re-run if board.toml changes
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    // Check if config file exists
    if !config_path.exists() {
        fail(
            "board.toml not found!",
            &[
                "The firmware requires a board.toml description file.".to_string(),
                "Please create one in the cadence-firmware directory.".to_string(),
            ],
        );
    }

    // Read the config file
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read board.toml", &[e.to_string()]),
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in board.toml",
            &e.to_string().lines().map(String::from).collect::<Vec<_>>(),
        ),
    };

    // Validate required sections exist
    validate_required_sections(&config);

    let mut errors = Vec::new();
    let clock = validate_clock(&config, &mut errors);
    let (led_data, status_led) = validate_pins(&config, &mut errors);
    let timing = validate_timing(&config, &mut errors);
    let (channels, sample_time) = validate_scan(&config, &mut errors);
    let (period_ms, palette_shift) = validate_demo(&config, &mut errors);

    for ch in &channels {
        if let Some(pin) = channel_pin(*ch) {
            if pin == led_data || pin == status_led {
                errors.push(format!(
                    "[scan] channel {} shares P{}{} with an LED",
                    ch, pin.0, pin.1
                ));
            }
        }
    }

    if !errors.is_empty() {
        fail("Invalid board configuration", &errors);
    }

    println!("cargo:warning=board.toml validated successfully");

    Board {
        clock,
        led_data,
        status_led,
        timing,
        channels,
        sample_time,
        period_ms,
        palette_shift,
    }
}

/// Abort the build with a boxed error report
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(lines)
    );
}

/// Format error message lines with box drawing
fn format_error_lines(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| {
            let truncated = if line.len() > 62 {
                format!("{}...", &line[..59])
            } else {
                line.to_string()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validate that required sections exist
fn validate_required_sections(config: &toml::Value) {
    let errors: Vec<String> = ["clock", "pins", "led_timing", "scan", "demo"]
        .iter()
        .filter(|section| !matches!(config.get(**section), Some(toml::Value::Table(_))))
        .map(|section| format!("Missing [{}] section", section))
        .collect();

    if !errors.is_empty() {
        fail("Missing required sections in board.toml", &errors);
    }
}

/// Read a required integer field, recording an error if absent or out of range
fn int_field(
    config: &toml::Value,
    section: &str,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) -> i64 {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Integer(value)) if range.contains(value) => *value,
        Some(toml::Value::Integer(_)) => {
            errors.push(format!(
                "[{}] {} must be {}-{}",
                section,
                key,
                range.start(),
                range.end()
            ));
            *range.start()
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            *range.start()
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            *range.start()
        }
    }
}

/// Validate the requested frequencies; the HAL derives the PLL from them
fn validate_clock(config: &toml::Value, errors: &mut Vec<String>) -> [i64; 4] {
    let hse_hz = int_field(config, "clock", "hse_hz", 4_000_000..=26_000_000, errors);
    let sysclk_hz = int_field(config, "clock", "sysclk_hz", 1..=MAX_SYSCLK_HZ, errors);
    let pclk1_hz = int_field(config, "clock", "pclk1_hz", 1..=MAX_PCLK1_HZ, errors);
    let pclk2_hz = int_field(config, "clock", "pclk2_hz", 1..=MAX_PCLK2_HZ, errors);

    for (key, bus) in [("pclk1_hz", pclk1_hz), ("pclk2_hz", pclk2_hz)] {
        if bus > sysclk_hz {
            errors.push(format!("[clock] {} above sysclk_hz", key));
        }
    }

    [hse_hz, sysclk_hz, pclk1_hz, pclk2_hz]
}

/// Parse a pin name such as "PC0"
fn parse_pin(s: &str) -> Option<(char, i64)> {
    let rest = s.trim().strip_prefix('P')?;
    let mut chars = rest.chars();
    let port = chars.next()?;
    if !('A'..='C').contains(&port) {
        return None;
    }
    let pin: i64 = chars.as_str().parse().ok()?;
    (0..=15).contains(&pin).then_some((port, pin))
}

/// Package pin behind an external ADC1 input; 16-18 are internal
fn channel_pin(channel: i64) -> Option<(char, i64)> {
    match channel {
        0..=7 => Some(('A', channel)),
        8..=9 => Some(('B', channel - 8)),
        10..=15 => Some(('C', channel - 10)),
        _ => None,
    }
}

fn validate_pins(config: &toml::Value, errors: &mut Vec<String>) -> ((char, i64), (char, i64)) {
    let mut pin = |key: &str| match config.get("pins").and_then(|p| p.get(key)) {
        Some(toml::Value::String(name)) => parse_pin(name).unwrap_or_else(|| {
            errors.push(format!("[pins] {} '{}' is not a pin (PA0-PC15)", key, name));
            ('A', 0)
        }),
        _ => {
            errors.push(format!("[pins] missing '{}'", key));
            ('A', 0)
        }
    };

    let led_data = pin("led_data");
    let status_led = pin("status_led");
    if led_data == status_led {
        errors.push("[pins] led_data and status_led must differ".to_string());
    }
    (led_data, status_led)
}

fn validate_timing(config: &toml::Value, errors: &mut Vec<String>) -> [i64; 6] {
    let mut pulse = |key| int_field(config, "led_timing", key, 1..=1_000_000, errors);
    let t0h = pulse("t0h_ns");
    let t0l = pulse("t0l_ns");
    let t1h = pulse("t1h_ns");
    let t1l = pulse("t1l_ns");
    let reset = pulse("reset_ns");
    let overhead = int_field(config, "led_timing", "overhead_cycles", 0..=1_000, errors);

    if t0h >= t1h {
        errors.push("[led_timing] t0h_ns must be shorter than t1h_ns".to_string());
    }
    [t0h, t0l, t1h, t1l, reset, overhead]
}

fn validate_scan(config: &toml::Value, errors: &mut Vec<String>) -> (Vec<i64>, &'static str) {
    let mut channels = Vec::new();
    match config.get("scan").and_then(|s| s.get("channels")) {
        Some(toml::Value::Array(list)) => {
            if list.len() != SCAN_CHANNELS {
                errors.push(format!(
                    "[scan] channels must list exactly {} inputs",
                    SCAN_CHANNELS
                ));
            }
            for value in list {
                match value {
                    toml::Value::Integer(ch) if (0..=MAX_ADC_CHANNEL).contains(ch) => {
                        if channels.contains(ch) {
                            errors.push(format!("[scan] channel {} listed twice", ch));
                        }
                        channels.push(*ch);
                    }
                    _ => errors.push(format!("[scan] channel {} is not 0-18", value)),
                }
            }
        }
        _ => errors.push("[scan] missing 'channels' array".to_string()),
    }
    channels.resize(SCAN_CHANNELS, 0);

    let cycles = int_field(config, "scan", "sample_cycles", 3..=480, errors);
    let sample_time = match SAMPLE_CYCLES.iter().find(|(c, _)| *c == cycles) {
        Some((_, name)) => *name,
        None => {
            errors.push(format!(
                "[scan] sample_cycles {} unsupported (3, 15, 28, 56, 84, 112, 144, 480)",
                cycles
            ));
            "Cycles28"
        }
    };

    (channels, sample_time)
}

fn validate_demo(config: &toml::Value, errors: &mut Vec<String>) -> (i64, u32) {
    let period_ms = int_field(config, "demo", "period_ms", 1..=10_000, errors);
    let step = int_field(config, "demo", "palette_step", 1..=1024, errors);
    if !(step as u64).is_power_of_two() {
        errors.push("[demo] palette_step must be a power of two".to_string());
    }
    (period_ms, step.trailing_zeros())
}

/// `board_pins!(dp)`: split the ports in use, put scan inputs in analog
/// mode and return the (LED data, status LED) outputs
fn pins_macro(board: &Board) -> String {
    let analog: Vec<(char, i64)> = board
        .channels
        .iter()
        .filter_map(|c| channel_pin(*c))
        .collect();

    let mut ports: Vec<char> = analog
        .iter()
        .chain([&board.led_data, &board.status_led])
        .map(|(port, _)| *port)
        .collect();
    ports.sort_unstable();
    ports.dedup();

    let mut body = String::new();
    for port in ports {
        let port = port.to_ascii_lowercase();
        body.push_str(&format!(
            "        let gpio{port} = ::stm32f4xx_hal::gpio::GpioExt::split($dp.GPIO{});\n",
            port.to_ascii_uppercase()
        ));
    }
    for (port, pin) in analog {
        let port = port.to_ascii_lowercase();
        body.push_str(&format!("        let _ = gpio{port}.p{port}{pin}.into_analog();\n"));
    }
    let output = |(port, pin): (char, i64)| {
        let port = port.to_ascii_lowercase();
        format!(
            "            ::cadence_hal_stm32f4::PushPullPin::new(gpio{port}.p{port}{pin}.into_push_pull_output()),\n"
        )
    };

    format!(
        "macro_rules! board_pins {{\n    \
            ($dp:ident) => {{{{\n\
        {body}        (\n\
        {}{}        )\n    \
            }}}};\n\
        }}\n",
        output(board.led_data),
        output(board.status_led),
    )
}

/// Write board_config.rs into OUT_DIR
fn generate_config(board: &Board) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let [hse_hz, sysclk_hz, pclk1_hz, pclk2_hz] = board.clock;
    let [t0h, t0l, t1h, t1l, reset, overhead] = board.timing;
    let channels = board
        .channels
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let source = format!(
        "// Generated by build.rs from board.toml\n\
        \n\
        pub const CLOCK: ClockConfig = ClockConfig {{\n    \
            hse_hz: {hse_hz},\n    \
            sysclk_hz: {sysclk_hz},\n    \
            pclk1_hz: {pclk1_hz},\n    \
            pclk2_hz: {pclk2_hz},\n\
        }};\n\
        \n\
        {}\n\
        pub const PULSE_TIMING: PulseTimingConfig = PulseTimingConfig {{\n    \
            t0h_ns: {t0h},\n    \
            t0l_ns: {t0l},\n    \
            t1h_ns: {t1h},\n    \
            t1l_ns: {t1l},\n    \
            reset_ns: {reset},\n    \
            overhead_cycles: {overhead},\n\
        }};\n\
        \n\
        pub const SCAN: ScanConfig = ScanConfig {{\n    \
            channels: [{channels}],\n    \
            sample_time: SampleTime::{},\n\
        }};\n\
        \n\
        pub const LOOP_PERIOD_MS: u32 = {};\n\
        pub const PALETTE_SHIFT: u32 = {};\n",
        pins_macro(board),
        board.sample_time,
        board.period_ms,
        board.palette_shift,
    );

    fs::write(out_dir.join("board_config.rs"), source).unwrap();
}
