//! Lumen - Light Sensor Monitor Firmware
//!
//! Main firmware binary for RP2040 boards with a photoresistor divider on
//! GPIO26 and an ILI9341 TFT on SPI0. An acquisition task samples the
//! divider and derives voltage, resistance and current; a presentation task
//! renders them. The two are linked either by a lock-guarded store or by a
//! bounded queue, selected in monitor.toml.
//!
//! Each task priority gets its own executor: high and normal run from
//! software interrupts and preempt the thread-mode executor that hosts
//! low-priority work.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embassy_executor::{Executor, InterruptExecutor, SendSpawner, SpawnError, SpawnToken, Spawner};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority as IrqPriority};
use embassy_rp::Peripherals;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{block_for, Duration};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use lumen_core::config::{LinkKind, MonitorConfig};
use lumen_core::link::MeasurementChannel;
use lumen_core::scheduler::{
    BoundedMutex, CancelToken, FatalError, InitError, Priority, Scheduler, StartedScheduler,
    TaskControl, TaskId,
};
use lumen_core::store::MeasurementStore;
use lumen_drivers::sensor::LdrSensor;

use crate::board::{Board, MonitorDisplay, RpAnalogInput};
use crate::link::SelectedLink;

mod board;
mod config;
mod fatal;
mod link;
mod tasks;

/// Raw mutex shared by everything that crosses executors
pub type Cs = CriticalSectionRawMutex;

// Never fired in production; tasks run until power-off
static CANCEL: CancelToken<Cs> = CancelToken::new();

// Static cells for shared state (must live forever for task references)
static STORE: StaticCell<MeasurementStore<Cs>> = StaticCell::new();
static CHANNEL: StaticCell<MeasurementChannel<Cs>> = StaticCell::new();
static DISPLAY: StaticCell<BoundedMutex<Cs, MonitorDisplay>> = StaticCell::new();
static ACQUISITION: StaticCell<TaskControl<'static, Cs>> = StaticCell::new();
static PRESENTATION: StaticCell<TaskControl<'static, Cs>> = StaticCell::new();

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_NORMAL: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

#[interrupt]
unsafe fn SWI_IRQ_0() {
    EXECUTOR_NORMAL.on_interrupt()
}

/// Everything the tasks need, built before any task runs
struct Monitor {
    scheduler: StartedScheduler<'static, Cs>,
    acquisition: TaskId,
    presentation: TaskId,
    sensor: LdrSensor<RpAnalogInput>,
    display: &'static BoundedMutex<Cs, MonitorDisplay>,
    link: SelectedLink,
    config: MonitorConfig,
}

/// One spawner per priority band
struct Spawners {
    high: SendSpawner,
    normal: SendSpawner,
    low: Spawner,
}

impl Spawners {
    fn spawn<S: Send>(&self, priority: Priority, token: SpawnToken<S>) -> Result<(), SpawnError> {
        match priority {
            Priority::High => self.high.spawn(token),
            Priority::Normal => self.normal.spawn(token),
            Priority::Low => self.low.spawn(token),
        }
    }
}

/// Main entry point
#[entry]
fn main() -> ! {
    info!("Lumen firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();

    // Let the supply and the panel settle before touching them
    block_for(Duration::from_millis(config.boot.settle_ms as u64));

    let monitor = match init(p, config) {
        Ok(monitor) => monitor,
        Err(e) => fatal::halt(FatalError::Init(e)),
    };

    interrupt::SWI_IRQ_1.set_priority(IrqPriority::P2);
    let high = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);

    interrupt::SWI_IRQ_0.set_priority(IrqPriority::P3);
    let normal = EXECUTOR_NORMAL.start(interrupt::SWI_IRQ_0);

    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|low| {
        let spawners = Spawners { high, normal, low };
        if let Err(e) = spawn_tasks(&spawners, monitor) {
            fatal::halt(FatalError::Init(e));
        }
        info!("All tasks spawned, firmware running");
    })
}

/// Bring up the board and the shared primitives, then register the tasks
fn init(p: Peripherals, config: MonitorConfig) -> Result<Monitor, InitError> {
    let board = Board::new(p)?;

    let sensor = LdrSensor::new(board.analog, config.acquisition.adc_channel, config.divider)
        .map_err(|_| InitError::Device("ldr"))?;

    let mut display = board.display;
    config
        .screen()
        .bring_up(&mut display, config.display.rotation())
        .map_err(|_| InitError::Device("display"))?;
    let display: &'static BoundedMutex<Cs, MonitorDisplay> = DISPLAY
        .try_init(BoundedMutex::new(display))
        .ok_or(InitError::Primitive("display lock"))?;

    let link = match config.link.kind {
        LinkKind::Store => SelectedLink::Store(
            STORE
                .try_init(MeasurementStore::new(config.link.lock_bound()))
                .ok_or(InitError::Primitive("store"))?,
        ),
        LinkKind::Channel => SelectedLink::Channel(
            CHANNEL
                .try_init(MeasurementChannel::new(config.link.send_policy()))
                .ok_or(InitError::Primitive("queue"))?,
        ),
    };

    let acquisition_control: &'static TaskControl<'static, Cs> = ACQUISITION
        .try_init(TaskControl::new(
            config.acquisition.task.spec("acquisition"),
            &CANCEL,
        ))
        .ok_or(InitError::Primitive("acquisition task"))?;
    let presentation_control: &'static TaskControl<'static, Cs> = PRESENTATION
        .try_init(TaskControl::new(
            config.presentation.task.spec("presentation"),
            &CANCEL,
        ))
        .ok_or(InitError::Primitive("presentation task"))?;

    let mut scheduler = Scheduler::new(config.boot.stack_budget);
    let acquisition = scheduler.register(acquisition_control)?;
    let presentation = scheduler.register(presentation_control)?;
    let scheduler = scheduler.start()?;

    Ok(Monitor {
        scheduler,
        acquisition,
        presentation,
        sensor,
        display,
        link,
        config,
    })
}

/// Hand each task to the executor of its priority band
fn spawn_tasks(spawners: &Spawners, monitor: Monitor) -> Result<(), InitError> {
    let Monitor {
        scheduler,
        acquisition,
        presentation,
        sensor,
        display,
        link,
        config,
    } = monitor;

    let control = scheduler
        .task(acquisition)
        .ok_or(InitError::Spawn("acquisition"))?;
    spawners
        .spawn(
            control.spec().priority,
            tasks::acquisition_task(control, sensor, link, config.acquisition.period()),
        )
        .map_err(|_| InitError::Spawn("acquisition"))?;

    let control = scheduler
        .task(presentation)
        .ok_or(InitError::Spawn("presentation"))?;
    spawners
        .spawn(
            control.spec().priority,
            tasks::presentation_task(
                control,
                display,
                link,
                config.screen(),
                config.presentation.timing(),
            ),
        )
        .map_err(|_| InitError::Spawn("presentation"))?;

    for priority in [Priority::High, Priority::Normal, Priority::Low] {
        for task in scheduler.band(priority) {
            debug!("{} band: {}", priority.as_str(), task.name());
        }
    }

    spawners
        .low
        .spawn(tasks::supervisor_task(scheduler))
        .map_err(|_| InitError::Spawn("supervisor"))?;

    Ok(())
}
