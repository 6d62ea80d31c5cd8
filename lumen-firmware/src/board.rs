//! Board wiring
//!
//! Photoresistor divider on GPIO26 (ADC0). ILI9341 on SPI0:
//! - CLK: GPIO18
//! - MOSI: GPIO19
//! - MISO: GPIO16
//! - CS: GPIO17
//! - DC: GPIO20
//! - RST: GPIO21

use defmt::*;
use display_interface_spi::SPIInterface;
use embassy_rp::adc::{self, Adc, Async};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output, Pull};
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Config as SpiConfig, Spi};
use embassy_rp::Peripherals;
use embassy_time::Delay;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use mipidsi::models::ILI9341Rgb565;
use mipidsi::options::{Orientation, Rotation as PanelRotation};
use mipidsi::Builder;

use lumen_core::scheduler::InitError;
use lumen_core::traits::{AnalogInput, DisplayError, Rotation, SensorError};
use lumen_drivers::display::{GraphicsDisplay, Orientable};

/// ADC input the divider is wired to
pub const LDR_ADC_CHANNEL: u8 = 0;

/// The ILI9341 accepts up to 10 MHz writes on paper; 40 MHz works in practice
const DISPLAY_SPI_HZ: u32 = 40_000_000;

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => adc::InterruptHandler;
});

type PanelSpi = ExclusiveDevice<Spi<'static, SPI0, Blocking>, Output<'static>, NoDelay>;
type Ili9341 = mipidsi::Display<SPIInterface<PanelSpi, Output<'static>>, ILI9341Rgb565, Output<'static>>;

/// Display the presentation task draws on
pub type MonitorDisplay = GraphicsDisplay<Panel>;

/// Async ADC bound to the divider pin
pub struct RpAnalogInput {
    adc: Adc<'static, Async>,
    pin: adc::Channel<'static>,
}

impl AnalogInput for RpAnalogInput {
    fn init(&mut self, channel: u8) -> Result<(), SensorError> {
        // The pin is claimed at construction; only its channel is valid
        if channel == LDR_ADC_CHANNEL {
            Ok(())
        } else {
            Err(SensorError::InvalidChannel)
        }
    }

    async fn sample(&mut self) -> Result<u16, SensorError> {
        self.adc
            .read(&mut self.pin)
            .await
            .map_err(|_| SensorError::ConversionError)
    }
}

/// ILI9341 behind the orientation interface the display adapter expects
pub struct Panel {
    inner: Ili9341,
}

fn orientation_for(rotation: Rotation) -> Orientation {
    let rotate = match rotation {
        Rotation::Portrait => PanelRotation::Deg0,
        Rotation::Landscape => PanelRotation::Deg90,
        Rotation::PortraitFlipped => PanelRotation::Deg180,
        Rotation::LandscapeFlipped => PanelRotation::Deg270,
    };
    // ILI9341 modules scan mirrored
    Orientation::new().rotate(rotate).flip_horizontal()
}

impl Orientable for Panel {
    fn set_orientation(&mut self, rotation: Rotation) -> Result<(), DisplayError> {
        self.inner
            .set_orientation(orientation_for(rotation))
            .map_err(|_| DisplayError::Bus)
    }
}

impl OriginDimensions for Panel {
    fn size(&self) -> Size {
        self.inner.size()
    }
}

impl DrawTarget for Panel {
    type Color = Rgb565;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.inner.draw_iter(pixels).map_err(|_| DisplayError::Bus)
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        self.inner
            .fill_contiguous(area, colors)
            .map_err(|_| DisplayError::Bus)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.inner
            .fill_solid(area, color)
            .map_err(|_| DisplayError::Bus)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.inner.clear(color).map_err(|_| DisplayError::Bus)
    }
}

/// Peripherals the monitor runs on
pub struct Board {
    pub analog: RpAnalogInput,
    pub display: MonitorDisplay,
}

impl Board {
    pub fn new(p: Peripherals) -> Result<Self, InitError> {
        let adc = Adc::new(p.ADC, Irqs, adc::Config::default());
        let pin = adc::Channel::new_pin(p.PIN_26, Pull::None);
        info!("ADC initialized on GPIO26");

        let mut spi_config = SpiConfig::default();
        spi_config.frequency = DISPLAY_SPI_HZ;
        let spi = Spi::new_blocking(p.SPI0, p.PIN_18, p.PIN_19, p.PIN_16, spi_config);

        let cs = Output::new(p.PIN_17, Level::High);
        let dc = Output::new(p.PIN_20, Level::Low);
        let rst = Output::new(p.PIN_21, Level::High);

        let device = ExclusiveDevice::new_no_delay(spi, cs)
            .map_err(|_| InitError::Device("display spi"))?;
        let interface = SPIInterface::new(device, dc);

        // Native panel is 240x320 portrait; the screen sets its own rotation
        let inner = Builder::new(ILI9341Rgb565, interface)
            .display_size(240, 320)
            .orientation(orientation_for(Rotation::Portrait))
            .reset_pin(rst)
            .init(&mut Delay)
            .map_err(|_| InitError::Device("ili9341"))?;
        info!("ILI9341 initialized");

        Ok(Self {
            analog: RpAnalogInput { adc, pin },
            display: GraphicsDisplay::new(Panel { inner }),
        })
    }
}
