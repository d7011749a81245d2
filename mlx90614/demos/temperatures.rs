use std::env;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{bail, Context};
use linux_embedded_hal::{Delay, I2cdev};

use mlx90614::calculations::celsius_to_fahrenheit;
use mlx90614::{Mlx90614, DEFAULT_ADDRESS};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 4 {
        bail!("Usage: {} <I2C bus> [sensor address] [count]", args[0]);
    }
    let address: u8 = match args.get(2) {
        Some(arg) if arg.starts_with("0x") => {
            let hex_digits = arg.split_at(2).1;
            u8::from_str_radix(hex_digits, 16).context("parsing the sensor address")?
        }
        Some(arg) => arg.parse().context("parsing the sensor address")?,
        None => DEFAULT_ADDRESS,
    };
    let count: usize = match args.get(3) {
        Some(arg) => arg.parse().context("parsing the number of readings")?,
        None => 10,
    };
    let bus_path = Path::new(&args[1]);
    let bus = I2cdev::new(bus_path).context("opening the I2C bus")?;
    let mut sensor = Mlx90614::new(bus, Delay, address)?;
    sensor.set_pec_verification(true);

    let emissivity = sensor.emissivity()?;
    let settling_time = sensor.settling_time()?;
    println!(
        "Emissivity: {:.3}, settling time: {}ms",
        emissivity, settling_time
    );
    let interval = Duration::from_millis(u64::from(settling_time).max(250));
    for _ in 0..count {
        let object = sensor.object_temperature()?;
        let ambient = sensor.ambient_temperature()?;
        println!(
            "Object: {:6.2}℃ ({:6.2}℉)  Ambient: {:6.2}℃",
            object,
            celsius_to_fahrenheit(object),
            ambient
        );
        sleep(interval);
    }
    Ok(())
}
