use std::env;
use std::path::Path;

use anyhow::{bail, Context};
use linux_embedded_hal::{Delay, I2cdev};

use mlx90614::{Mlx90614, NoiseFilter, SpikeFilter, DEFAULT_ADDRESS};

fn parse_noise_filter(arg: &str) -> anyhow::Result<NoiseFilter> {
    Ok(match arg {
        "128" => NoiseFilter::Fir128,
        "256" => NoiseFilter::Fir256,
        "512" => NoiseFilter::Fir512,
        "1024" => NoiseFilter::Fir1024,
        _ => bail!("The FIR filter must be one of 128, 256, 512, or 1024"),
    })
}

fn parse_spike_filter(arg: &str) -> anyhow::Result<SpikeFilter> {
    Ok(match arg {
        "100" => SpikeFilter::Limit100,
        "80" => SpikeFilter::Limit80,
        "67" => SpikeFilter::Limit67,
        "57" => SpikeFilter::Limit57,
        "50" => SpikeFilter::Limit50,
        "25" => SpikeFilter::Limit25,
        "17" => SpikeFilter::Limit17,
        "13" => SpikeFilter::Limit13,
        _ => bail!("The IIR filter must be one of 100, 80, 67, 57, 50, 25, 17, or 13"),
    })
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 && args.len() != 4 {
        bail!("Usage: {} <I2C bus> [<FIR filter> <IIR filter>]", args[0]);
    }
    let bus_path = Path::new(&args[1]);
    let bus = I2cdev::new(bus_path).context("opening the I2C bus")?;
    let mut sensor = Mlx90614::new(bus, Delay, DEFAULT_ADDRESS)?;

    if args.len() == 4 {
        let noise = parse_noise_filter(&args[2])?;
        let spike = parse_spike_filter(&args[3])?;
        sensor.set_filters(noise, spike)?;
    }

    let config = sensor.config_register()?;
    println!("Config register 1: {:#06X}", config.raw());
    println!("FIR filter: {:?}", sensor.noise_filter()?);
    println!("IIR filter: {:?}", sensor.spike_filter()?);
    println!("Dual IIR: {}", sensor.dual_iir()?);
    println!("Settling time: {}ms", sensor.settling_time()?);
    Ok(())
}
