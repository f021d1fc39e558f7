/*!
PPU implementation providing:
- CPU-visible register interface (8-port window, see `registers.rs`)
- A private video bus (`Dispatcher`) over CHR, four name tables and palette memory
- Tick-driven timing: 341 ticks per scanline, 260 scanlines per frame
- Vblank flag handling and an injected NMI callback at end of frame
- Per-scanline background pass followed by a sprite pass into a `VideoOutput`

Video bus layout (registration order, first match wins):
- $0000-$1FFF: CHR ROM as supplied (8 KiB CHR RAM when the blob is empty)
- $2000-$2FFF: four independent 1 KiB name tables (attribute table at +$3C0)
- $3000-$3EFF: the same name tables again
- $3F00-$3F1F: palette memory, repeated every 32 bytes up to $3FFF

Timing states are the `(tick_counter, scan_line)` pair:
- line 260 wraps to 0: present the frame, set vblank, clear sprite-0 hit,
  then call the NMI callback if control bit 7 is set
- line 20: clear vblank; lines 20..=259 are the 240 visible rows

STRUCTURE:
- `registers.rs` — port read/write semantics and `Memory` impl
- `renderer.rs` — `tick` and `render_scan_line`
- `fetch.rs` — background pass
- `sprite.rs` — sprite pass
- `palette.rs`, `oam.rs` — palette and sprite storage
- `output.rs` — host frame surface

NOTES / LIMITATIONS:
- Sprite-0 hit is cleared at end of frame but never set by rendering.
- Vertical scroll is latched but not applied; horizontal scroll is.
*/

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use log::info;

use crate::error::BusResult;
use crate::memory::{Dispatcher, Ram, Rom, shared};

pub(crate) mod fetch;
pub mod oam;
pub mod output;
pub mod palette;
pub mod registers;
pub(crate) mod renderer;
pub(crate) mod sprite;

pub use oam::{Sprite, SpriteAttributes, SpriteMemory};
pub use output::{FrameBuffer, VideoOutput};
pub use palette::PaletteMemory;
pub use registers::{Control, Status};

/// Screen width in pixels.
pub const NES_WIDTH: usize = 256;
/// Screen height in pixels.
pub const NES_HEIGHT: usize = 240;

/// Ticks per scanline; the counter runs 0..=340.
pub const TICKS_PER_LINE: u16 = 341;
/// Scanlines per frame; the counter runs 0..=259.
pub const LINES_PER_FRAME: u16 = 260;
/// First visible scanline; vblank is cleared when it is reached.
pub const FIRST_VISIBLE_LINE: u16 = 20;

/// Size of the CHR RAM allocated when a cartridge carries no CHR ROM.
pub const CHR_RAM_SIZE: usize = 0x2000;
/// Size of one name table including its attribute table.
pub const NAME_TABLE_SIZE: usize = 0x0400;

/// Master palette, `0x00RRGGBB`, indexed by the 6-bit palette entry.
pub const RGB_PALETTE: [u32; 64] = [
    0x747474, 0x24188c, 0x0000a8, 0x44009c, 0x8c0074, 0xa80010, 0xa40000, 0x7c0800,
    0x402c00, 0x004400, 0x005000, 0x003c14, 0x183c5c, 0x000000, 0x000000, 0x000000,
    0xbcbcbc, 0x0070ec, 0x2038ec, 0x8000f0, 0xbc00bc, 0xe40058, 0xd82800, 0xc84c0c,
    0x887000, 0x009400, 0x00a800, 0x009038, 0x008088, 0x000000, 0x000000, 0x000000,
    0xf8f8f8, 0x3cbcfc, 0x5c94fc, 0x4088fc, 0xf478fc, 0xfc74b4, 0xfc7460, 0xfc9838,
    0xf0bc3c, 0x80d010, 0x4cdc48, 0x58f898, 0x00e8d8, 0x787878, 0x000000, 0x000000,
    0xffffff, 0xa8e4fc, 0xc4d4fc, 0xd4c8fc, 0xfcc4fc, 0xfcc4d8, 0xfcbcb0, 0xfcd8a8,
    0xfce4a0, 0xe0fca0, 0xa8f0bc, 0xb0fccc, 0x9cfcf0, 0xc4c4c4, 0x000000, 0x000000,
];

/// Construction-time options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PpuConfig {
    /// Alternate bit 6 of every status read (set on even-numbered reads).
    /// Some software spins on that bit waiting for sprite-0 hit, which is not
    /// otherwise produced.
    pub status_toggle_quirk: bool,
}

impl Default for PpuConfig {
    fn default() -> Self {
        Self {
            status_toggle_quirk: true,
        }
    }
}

pub struct Ppu {
    // CPU-visible registers
    ctrl: Control,
    mask: u8,
    status: Status,

    // Two-write toggles; only the address one is reset by a status read.
    first_write: bool,
    first_scroll_write: bool,
    address: u16,
    data_latch: u8,
    scroll_x: u8,
    scroll_y: u8,

    // Timing
    tick_counter: u16,
    scan_line: u16,
    frames: u64,
    lines_rendered: u64,
    status_reads: u32,

    config: PpuConfig,

    // Video bus and the regions mapped on it
    memory: Dispatcher,
    name_tables: [Rc<RefCell<Ram>>; 4],
    oam: Rc<RefCell<SpriteMemory>>,

    output: Box<dyn VideoOutput>,
    nmi_callback: Option<Box<dyn FnMut()>>,
}

impl Ppu {
    /// PPU over the given CHR blob with default options and an in-memory frame buffer.
    pub fn new(chr: &[u8]) -> Self {
        Self::with_output(chr, PpuConfig::default(), Box::new(FrameBuffer::new()))
    }

    pub fn with_config(chr: &[u8], config: PpuConfig) -> Self {
        Self::with_output(chr, config, Box::new(FrameBuffer::new()))
    }

    pub fn with_output(chr: &[u8], config: PpuConfig, output: Box<dyn VideoOutput>) -> Self {
        let mut memory = Dispatcher::new();

        if chr.is_empty() {
            info!("no CHR ROM; mapping {} bytes of CHR RAM", CHR_RAM_SIZE);
            memory.register_range(0x0000, CHR_RAM_SIZE as u16, shared(Ram::new(CHR_RAM_SIZE)));
        } else {
            // Without bank switching only the first 8 KiB are ever visible.
            let visible = chr.len().min(CHR_RAM_SIZE);
            info!("mapping {} bytes of CHR ROM", visible);
            memory.register_range(0x0000, visible as u16, shared(Rom::from_slice(&chr[..visible])));
        }

        let name_tables: [Rc<RefCell<Ram>>; 4] =
            std::array::from_fn(|_| shared(Ram::new(NAME_TABLE_SIZE)));
        for (i, nt) in name_tables.iter().enumerate() {
            let base = 0x2000 + (i * NAME_TABLE_SIZE) as u16;
            memory.register_range(base, NAME_TABLE_SIZE as u16, nt.clone());
        }
        // $3000-$3EFF repeats $2000-$2EFF.
        for (i, nt) in name_tables.iter().enumerate() {
            let base = 0x3000 + (i * NAME_TABLE_SIZE) as u16;
            let size = (NAME_TABLE_SIZE as u16).min(0x3F00 - base);
            memory.register_range(base, size, nt.clone());
        }

        let palette = shared(PaletteMemory::new());
        for k in 0..8u16 {
            memory.register_range(0x3F00 + k * 0x20, 0x20, palette.clone());
        }

        Self {
            ctrl: Control::empty(),
            mask: 0,
            status: Status::empty(),
            first_write: true,
            first_scroll_write: true,
            address: 0,
            data_latch: 0,
            scroll_x: 0,
            scroll_y: 0,
            tick_counter: 0,
            scan_line: 0,
            frames: 0,
            lines_rendered: 0,
            status_reads: 0,
            config,
            memory,
            name_tables,
            oam: shared(SpriteMemory::new()),
            output,
            nmi_callback: None,
        }
    }

    /// Install the end-of-frame interrupt callback. Replaces any previous one.
    pub fn set_nmi_callback<F: FnMut() + 'static>(&mut self, callback: F) {
        self.nmi_callback = Some(Box::new(callback));
    }

    /// Shared handle to sprite memory (for the DMA port and tests).
    pub fn oam(&self) -> Rc<RefCell<SpriteMemory>> {
        self.oam.clone()
    }

    pub fn output(&self) -> &dyn VideoOutput {
        self.output.as_ref()
    }

    pub fn output_mut(&mut self) -> &mut dyn VideoOutput {
        self.output.as_mut()
    }

    // Raw video bus access, no register side effects.
    pub fn video_read(&self, address: u16) -> BusResult<u8> {
        self.memory.read(address)
    }
    pub fn video_write(&self, address: u16, value: u8) -> BusResult<()> {
        self.memory.write(address, value)
    }

    // Register and counter accessors
    pub fn ctrl(&self) -> Control {
        self.ctrl
    }
    pub fn mask(&self) -> u8 {
        self.mask
    }
    pub fn status(&self) -> Status {
        self.status
    }
    pub fn vblank(&self) -> bool {
        self.status.contains(Status::VBLANK)
    }
    pub fn sprite_zero_hit(&self) -> bool {
        self.status.contains(Status::SPRITE_ZERO_HIT)
    }
    pub fn vram_address(&self) -> u16 {
        self.address
    }
    pub fn data_latch(&self) -> u8 {
        self.data_latch
    }
    pub fn first_write_pending(&self) -> bool {
        self.first_write
    }
    pub fn scroll(&self) -> (u8, u8) {
        (self.scroll_x, self.scroll_y)
    }
    pub fn tick_counter(&self) -> u16 {
        self.tick_counter
    }
    pub fn scan_line(&self) -> u16 {
        self.scan_line
    }
    /// Completed frames since construction.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
    /// Scanline renders triggered by `tick` since construction.
    pub fn lines_rendered(&self) -> u64 {
        self.lines_rendered
    }
    pub fn config(&self) -> PpuConfig {
        self.config
    }

    /// Hex dump of the four name tables, 32 entries per line.
    pub fn dump_name_tables(&self) -> String {
        let mut out = String::new();
        for (i, nt) in self.name_tables.iter().enumerate() {
            let nt = nt.borrow();
            let _ = writeln!(out, "name table {} (${:04X})", i, 0x2000 + i * NAME_TABLE_SIZE);
            for row in nt.as_slice().chunks(32) {
                let line: Vec<String> = row.iter().map(|b| format!("{:02x}", b)).collect();
                let _ = writeln!(out, "{}", line.join(" "));
            }
        }
        out
    }
}
