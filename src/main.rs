use std::collections::VecDeque;
use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use nemu::bus::{CpuCore, SystemBus};
use nemu::error::BusResult;
use nemu::{Cartridge, Console};

/// Render the CHR tiles of an iNES cartridge through the PPU.
#[derive(Parser, Debug)]
#[command(name = "nemu", version)]
struct Args {
    /// iNES image to load
    rom: PathBuf,
    /// Frames to run
    #[arg(short, long, default_value_t = 2)]
    frames: u64,
    /// Pattern table to show (0 or 1)
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    table: u8,
    /// Save the last frame as a PNG
    #[arg(long)]
    screenshot: Option<PathBuf>,
    /// Open a window and keep rendering until it is closed
    #[arg(long)]
    display: bool,
    /// Print the name tables after running
    #[arg(long)]
    dump: bool,
}

/// Stand-in CPU: replays register writes that lay out a 16x16 tile grid, then idles.
struct TileOverview {
    writes: VecDeque<(u16, u8)>,
    pc: u16,
    nmis: u64,
}

impl TileOverview {
    fn new(table: u8) -> Self {
        let mut writes = VecDeque::new();
        writes.push_back((0x2000, 0x00));
        writes.push_back((0x2001, 0x00));

        // greyscale background palette
        writes.push_back((0x2006, 0x3F));
        writes.push_back((0x2006, 0x00));
        for colour in [0x0F, 0x00, 0x10, 0x30] {
            writes.push_back((0x2007, colour));
        }

        // tiles 0..=255 as a 16x16 block starting at tile (8, 7)
        for row in 0..16u16 {
            let address = 0x2000 + (7 + row) * 32 + 8;
            writes.push_back((0x2006, (address >> 8) as u8));
            writes.push_back((0x2006, address as u8));
            for col in 0..16u16 {
                writes.push_back((0x2007, (row * 16 + col) as u8));
            }
        }

        writes.push_back((0x2005, 0x00));
        writes.push_back((0x2005, 0x00));
        writes.push_back((0x2000, 0x80 | (table << 4)));
        writes.push_back((0x2001, 0x0A));

        Self {
            writes,
            pc: 0x8000,
            nmis: 0,
        }
    }
}

impl CpuCore for TileOverview {
    fn tick(&mut self, bus: &SystemBus) -> BusResult<()> {
        if let Some((address, data)) = self.writes.pop_front() {
            bus.write(address, data)?;
            self.pc = self.pc.wrapping_add(3);
        }
        Ok(())
    }

    fn nmi(&mut self) {
        self.nmis += 1;
    }

    fn program_counter(&self) -> u16 {
        self.pc
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let cart = Cartridge::from_ines_file(&args.rom)?;
    println!(
        "{}: PRG {} KiB, CHR {} KiB, mapper {}, {:?} mirroring",
        args.rom.display(),
        cart.prg_rom().len() / 1024,
        cart.chr_rom().len() / 1024,
        cart.mapper_id(),
        cart.mirroring()
    );

    let mut console = Console::new(&cart, TileOverview::new(args.table));
    for _ in 0..args.frames {
        console.run_frame()?;
    }
    println!("frames: {}", console.frame_count());
    println!("CPU ticks: {}", console.cpu_ticks());
    println!("NMIs: {}", console.cpu().nmis);

    if args.dump {
        print!("{}", console.ppu().borrow().dump_name_tables());
    }

    if let Some(path) = &args.screenshot {
        save_screenshot(&console, path)?;
    }

    if args.display {
        show(console)?;
    }
    Ok(())
}

#[cfg(feature = "screenshot")]
fn save_screenshot<C: CpuCore>(
    console: &Console<C>,
    path: &std::path::Path,
) -> Result<(), Box<dyn Error>> {
    let ppu = console.ppu();
    nemu::screenshot::save_png(ppu.borrow().output(), path)?;
    println!("wrote {}", path.display());
    Ok(())
}

#[cfg(not(feature = "screenshot"))]
fn save_screenshot<C: CpuCore>(
    _console: &Console<C>,
    _path: &std::path::Path,
) -> Result<(), Box<dyn Error>> {
    Err("built without the `screenshot` feature".into())
}

#[cfg(feature = "display")]
fn show<C: CpuCore>(console: Console<C>) -> Result<(), Box<dyn Error>> {
    nemu::display::run(console)?;
    Ok(())
}

#[cfg(not(feature = "display"))]
fn show<C: CpuCore>(_console: Console<C>) -> Result<(), Box<dyn Error>> {
    Err("built without the `display` feature".into())
}
