#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::{Delay, Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;
use gauge_core::sampling::Sampler;
use gauge_core::sensors::{Bmp280, SensorDriver, Smp3011};
use gauge_firmware::board::{self, CONFIG};
use gauge_firmware::tasks::{self, BAROMETER_READING, GAUGE_READING, SensorDevice};
use log::{debug, info};

const AMBIENT_LOG_INTERVAL: Duration = Duration::from_secs(5);

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "the display framebuffer is built here before it moves into its task"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized");

    CONFIG.validate().expect("Invalid gauge configuration");
    board::log_config(&CONFIG);

    let led = board::led(peripherals.GPIO16);
    let button = board::button(peripherals.GPIO27);
    let display = board::init_display(peripherals.I2C0, peripherals.GPIO5, peripherals.GPIO4);
    let sensor_bus =
        board::create_sensor_bus(peripherals.I2C1, peripherals.GPIO33, peripherals.GPIO32);

    let mut sampler = Sampler::new(
        SensorDriver::new(
            Bmp280::new(SensorDevice::new(sensor_bus), Delay),
            &BAROMETER_READING,
        ),
        SensorDriver::new(
            Smp3011::new(SensorDevice::new(sensor_bus), Delay),
            &GAUGE_READING,
        ),
    );
    // Publish one round before the render task starts reading.
    sampler.init().await;
    sampler.sample_once().await;

    spawner
        .spawn(tasks::blink_task(led, CONFIG.periods.blink()))
        .expect("Failed to spawn blink task");
    spawner
        .spawn(tasks::sampling_task(sampler, CONFIG.periods.sample()))
        .expect("Failed to spawn sampling task");
    spawner
        .spawn(tasks::render_task(display, button, CONFIG))
        .expect("Failed to spawn render task");

    info!("Tasks started");

    loop {
        Timer::after(AMBIENT_LOG_INTERVAL).await;
        let ambient = BAROMETER_READING.snapshot();
        debug!(
            "Ambient: {} hPa, {} C",
            ambient.pressure_pa / 100.0,
            ambient.temperature_c
        );
    }
}
