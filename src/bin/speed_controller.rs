//! STM32F103 Blue Pill Software PWM DC Motor Speed Controller
//! =============================================================================================
//!
//! A DC motor driver input (transistor base or H-bridge enable) is fed with a
//! 1 kHz square wave synthesized in software: every TIM2 update interrupt
//! flips the output and reloads the timer with the duration of the new phase.
//! The low (active) share of the period follows a speed index 0..=8.
//!
//! Hardware Connections:
//!   Motor driver input -> PA1
//!
//!   Buttons (to GND, internal pull-up):
//!      SLOWER -> PB0
//!      FASTER -> PB1
//!
//!   USB-serial adapter (9600 8N1):
//!      RX -> PA9  (USART1_TX)
//!      TX -> PA10 (USART1_RX)
//!
//! Serial Protocol:
//!   - Send one digit '0'..'8' to set the speed index; the byte is echoed back.
//!   - Anything else is echoed followed by '?' and ignored. CR/LF are skipped.
//!   - Each button press echoes the new speed index as a digit.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt_rtt as _; // Global logger
use embassy_executor::Spawner;
use embassy_stm32::{
    bind_interrupts,
    exti::ExtiInput,
    gpio::{Level, Output, Pull, Speed},
    interrupt,
    interrupt::{InterruptExt, Priority},
    peripherals,
    time::Hertz,
    timer::low_level::Timer,
    usart::{self, Uart},
};
use embassy_sync::{
    blocking_mutex::{Mutex, raw::CriticalSectionRawMutex},
    signal::Signal,
};
use embassy_time::Delay;
use panic_probe as _; // Panic handler
use static_cell::StaticCell;

use pwm_speed_control::{
    config::{BAUD_RATE, DEBOUNCE_MS, PWM_HZ, PwmConfig},
    control::{EdgeSet, Echo, Phase, PendingEdges, PhaseToggler, SpeedIndex, SpeedSetter},
    hardware::{
        gpio_button::DebouncedButton,
        tim_countdown::TimCountdown,
        uart_console::{CommandRx, Console},
    },
};

/// TIM2 counts at 8 MHz, so one 1 ms period is 8000 ticks.
const TICK_HZ: u32 = 8_000_000;

/// NVIC priority shared by the phase timer and the button EXTI lines.
const IRQ_PRIORITY: Priority = Priority::P2;

type PwmPin = Output<'static>;
type PwmTimer = TimCountdown<'static, peripherals::TIM2>;
type SpeedButton = DebouncedButton<ExtiInput<'static>, Delay>;

/// State owned by the TIM2 update interrupt.
struct PwmChannel {
    toggler: PhaseToggler,
    pin: PwmPin,
    timer: PwmTimer,
}

static SPEED: SpeedIndex = SpeedIndex::new(
    PwmConfig::DEFAULT.default_index,
    PwmConfig::DEFAULT.max_index,
);

static PWM: Mutex<CriticalSectionRawMutex, RefCell<Option<PwmChannel>>> =
    Mutex::new(RefCell::new(None));

// Pending button edges and the wake-up for the speed handler
static PENDING: PendingEdges = PendingEdges::new();
static EDGE_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

static CONSOLE: StaticCell<Console> = StaticCell::new();

bind_interrupts!(struct Irqs {
    USART1 => usart::InterruptHandler<peripherals::USART1>;
});

/// Main application entry point
///
/// Brings up clocks, the serial channel, pins, the phase timer and the button
/// lines, then runs the serial command loop forever.
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // HSE 8 MHz * 9 = 72 MHz system clock, APB1 timers at 72 MHz
    let mut config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::*;
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Oscillator,
        });
        config.rcc.pll = Some(Pll {
            src: PllSource::HSE,
            prediv: PllPreDiv::DIV1,
            mul: PllMul::MUL9,
        });
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV2;
        config.rcc.apb2_pre = APBPrescaler::DIV1;
    }
    let p = embassy_stm32::init(config);

    let pwm_config = PwmConfig::for_tick_rate(TICK_HZ, PWM_HZ)
        .validate()
        .expect("invalid PWM configuration");
    defmt::info!(
        "motor pwm: period {} ticks, speed {} of {}",
        pwm_config.period_ticks,
        SPEED.get(),
        SPEED.max()
    );

    // USART1 at 9600 baud
    let mut uart_config = usart::Config::default();
    uart_config.baudrate = BAUD_RATE;
    let uart = Uart::new(
        p.USART1,
        p.PA10,
        p.PA9,
        Irqs,
        p.DMA1_CH4,
        p.DMA1_CH5,
        uart_config,
    )
    .expect("usart1 config");
    let (tx, rx) = uart.split();
    let console: &'static Console = CONSOLE.init(Console::new(tx));
    let mut commands = CommandRx::new(rx);

    // PWM output starts low, in the low phase of the default speed
    let mut pin = Output::new(p.PA1, Level::Low, Speed::Low);
    let mut timer = TimCountdown::new(Timer::new(p.TIM2), Hertz(TICK_HZ));
    let mut toggler = PhaseToggler::new(pwm_config, Phase::Low);
    let first = toggler
        .start(&mut pin, &mut timer, &SPEED)
        .unwrap_or_else(|e| match e {});
    defmt::debug!("first phase armed for {} ticks", first);

    PWM.lock(|cell| {
        *cell.borrow_mut() = Some(PwmChannel {
            toggler,
            pin,
            timer,
        });
    });

    interrupt::TIM2.set_priority(IRQ_PRIORITY);
    unsafe { interrupt::TIM2.enable() };
    PWM.lock(|cell| {
        if let Some(pwm) = cell.borrow_mut().as_mut() {
            pwm.timer.start();
        }
    });

    // Buttons on EXTI0/EXTI1 with pull-ups
    let slower_exti = ExtiInput::new(p.PB0, p.EXTI0, Pull::Up);
    let faster_exti = ExtiInput::new(p.PB1, p.EXTI1, Pull::Up);
    let slower = DebouncedButton::new(slower_exti, Delay, DEBOUNCE_MS);
    let faster = DebouncedButton::new(faster_exti, Delay, DEBOUNCE_MS);
    interrupt::EXTI0.set_priority(IRQ_PRIORITY);
    interrupt::EXTI1.set_priority(IRQ_PRIORITY);

    spawner
        .spawn(button_task(slower, EdgeSet::SLOWER))
        .expect("Failed to spawn slower button task");
    spawner
        .spawn(button_task(faster, EdgeSet::FASTER))
        .expect("Failed to spawn faster button task");
    spawner
        .spawn(speed_task(console))
        .expect("Failed to spawn speed task");

    // Foreground command loop
    let setter = SpeedSetter::new(&SPEED);
    loop {
        let byte = match commands.read_byte().await {
            Ok(b) => b,
            Err(e) => {
                defmt::warn!("uart rx error: {}", e);
                continue;
            }
        };

        match setter.on_command(byte) {
            Ok(Some(echo)) => console.echo(echo).await,
            Ok(None) => {}
            Err(e) => {
                defmt::warn!("rejected command: {}", e);
                console.echo(Echo::Rejected(e.byte())).await;
            }
        }
    }
}

/// TIM2 update: end of the current phase.
#[interrupt]
fn TIM2() {
    PWM.lock(|cell| {
        if let Some(pwm) = cell.borrow_mut().as_mut() {
            if pwm.timer.on_interrupt() {
                let PwmChannel { toggler, pin, timer } = pwm;
                let _ = toggler.fire(pin, timer, &SPEED);
            }
        }
    });
}

/// Button Task
///
/// Latches one edge source per confirmed press and wakes the speed task.
#[embassy_executor::task(pool_size = 2)]
async fn button_task(mut button: SpeedButton, source: EdgeSet) {
    loop {
        button.wait_for_press().await;

        PENDING.raise(source);
        EDGE_SIGNAL.signal(());

        button.wait_for_release().await;
    }
}

/// Speed Task
///
/// Consumes all latched edges in one pass and echoes the resulting speed.
#[embassy_executor::task]
async fn speed_task(console: &'static Console) {
    let setter = SpeedSetter::new(&SPEED);

    loop {
        EDGE_SIGNAL.wait().await;

        let edges = PENDING.take();
        if edges.is_empty() {
            continue;
        }

        let echo = setter.on_edges(edges);
        defmt::info!("buttons: speed now {}", setter.speed());
        console.echo(echo).await;
    }
}
