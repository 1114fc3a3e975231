//! Cadence - Real-time signal I/O firmware
//!
//! Main firmware binary for STM32F405-based signal boards.
//! Drives a one-wire color LED with cycle-counted pulses and keeps a
//! five-channel analog scan running in the background.
//!
//! There is no executor. The scan is hardware plus one interrupt; the
//! foreground is a plain loop paced by the cycle counter.

#![no_std]
#![no_main]

use core::cell::RefCell;

use cortex_m_rt::entry;
use critical_section::Mutex;
use defmt::*;
use static_cell::StaticCell;
use stm32f4xx_hal::pac::{self, interrupt};
use {defmt_rtt as _, panic_probe as _};

use cadence_core::acquisition::{Acquisition, InitStatus, ScanReadings, NUM_CHANNELS, WINDOW_LEN};
use cadence_core::config::ScanConfig;
use cadence_core::led::{ColorTransmitter, PulseTiming, StatusLed};
use cadence_core::load::LoadMeter;
use cadence_core::timer::CycleTimer;
use cadence_hal_stm32f4::{rcc, Adc1Scan, Dma2Stream0, DwtCounter, PushPullPin};

mod board;

type ScanPipeline = Acquisition<'static, Adc1Scan, Dma2Stream0<NUM_CHANNELS>>;

/// Loop iterations between interrupt load reports
const LOAD_REPORT_INTERVAL: u32 = 100;

/// State owned by the scan-complete interrupt
struct ScanIsr {
    pipeline: ScanPipeline,
    timer: CycleTimer<DwtCounter>,
    load: LoadMeter,
}

/// Filtered readings, published by the interrupt
static READINGS: ScanReadings = ScanReadings::new();

// DMA destination buffer (must live forever)
static SCAN_BUFFER: StaticCell<[u16; NUM_CHANNELS]> = StaticCell::new();

static SCAN_ISR: Mutex<RefCell<Option<ScanIsr>>> = Mutex::new(RefCell::new(None));

/// Main entry point
#[entry]
fn main() -> ! {
    info!("Cadence firmware starting...");

    let Some(dp) = pac::Peripherals::take() else {
        defmt::panic!("Device peripherals already taken");
    };

    let clocks = match rcc::init(dp.RCC, &board::CLOCK) {
        Ok(clocks) => clocks,
        Err(e) => defmt::panic!("Clock bring-up failed: {}", e),
    };
    let sysclk_hz = clocks.sysclk().raw();
    info!(
        "SYSCLK running at {} Hz (PCLK2 {} Hz)",
        sysclk_hz,
        clocks.pclk2().raw()
    );

    let config = board::config(sysclk_hz);
    if let Err(e) = config.validate() {
        defmt::panic!("Invalid board configuration: {}", e);
    }

    let mut timer = CycleTimer::new(DwtCounter::new(), sysclk_hz);
    timer.enable();

    let timing = PulseTiming::from_config(sysclk_hz, &config.timing);
    info!(
        "Pulse timing (cycles): t0h={} t0l={} t1h={} t1l={} trst={}",
        timing.t0h, timing.t0l, timing.t1h, timing.t1l, timing.trst
    );

    // Scan inputs go analog here, before the converter starts
    let (led_pin, status_pin) = board::board_pins!(dp);
    let led = ColorTransmitter::new(led_pin, timing);
    let status = StatusLed::new(status_pin);

    let adc = Adc1Scan::new(dp.ADC1, dp.ADC_COMMON);
    let init = start_acquisition(adc, dp.DMA2, timer, config.scan);
    report_init(init);

    run(led, status, timer)
}

/// Hand the pipeline to the interrupt and start scanning
fn start_acquisition(
    adc: Adc1Scan,
    dma: pac::DMA2,
    timer: CycleTimer<DwtCounter>,
    scan: ScanConfig,
) -> InitStatus {
    let buffer = SCAN_BUFFER.init([0; NUM_CHANNELS]);
    let pipeline = Acquisition::new(adc, Dma2Stream0::new(dma, buffer), scan, &READINGS);

    // The interrupt is unmasked inside init; it cannot run before the
    // critical section ends, by which point its state is in place.
    critical_section::with(|cs| {
        let mut slot = SCAN_ISR.borrow_ref_mut(cs);
        let isr = slot.insert(ScanIsr {
            pipeline,
            timer,
            load: LoadMeter::new(),
        });
        isr.pipeline.init()
    })
}

fn report_init(status: InitStatus) {
    if status.is_ok() {
        info!(
            "Acquisition running: {} channels, {} pass window",
            NUM_CHANNELS, WINDOW_LEN
        );
        return;
    }

    for step in status.failed_steps() {
        error!("Acquisition setup failed: {}", step);
    }
    warn!("Acquisition started anyway (status {=u8:#04x})", status.bits());
}

/// Foreground loop: step the palette, blink, report
fn run(
    mut led: ColorTransmitter<PushPullPin>,
    mut status: StatusLed<PushPullPin>,
    timer: CycleTimer<DwtCounter>,
) -> ! {
    let mut count: u32 = 0;
    let mut primed = false;

    loop {
        let color = led.set_indexed(&timer, (count >> board::PALETTE_SHIFT) as u8);
        status.toggle();

        if !primed && READINGS.is_primed() {
            primed = true;
            info!("Filter primed after {} passes", READINGS.passes());
        }

        info!("{} {}", color, READINGS.snapshot());

        if count % LOAD_REPORT_INTERVAL == 0 {
            let load = critical_section::with(|cs| {
                SCAN_ISR
                    .borrow_ref(cs)
                    .as_ref()
                    .map(|isr| isr.load.measurement())
            });
            if let Some(load) = load {
                debug!(
                    "Scan IRQ load {} permille ({} of {} cycles)",
                    load.permille(),
                    load.active_cycles,
                    load.total_cycles
                );
            }
        }

        timer.delay_ms(board::LOOP_PERIOD_MS);
        count = count.wrapping_add(1);
    }
}

#[interrupt]
fn DMA2_STREAM0() {
    critical_section::with(|cs| {
        if let Some(isr) = SCAN_ISR.borrow_ref_mut(cs).as_mut() {
            isr.load.start(&isr.timer);
            isr.pipeline.on_scan_complete();
            isr.load.end(&isr.timer);
        }
    });
}
