//! 433 MHz fixed-code receiver.
//!
//! The receiver module's DATA line toggles on every carrier on/off
//! transition.  A GPIO ISR timestamps each edge and pushes the duration
//! since the previous edge into a lock-free ring; the main loop drains
//! the ring, feeds [`PulseDecoder`] and keeps the newest accepted code.
//!
//! ```text
//! ┌──────────────┐   µs    ┌─────────────┐        ┌──────────────┐
//! │ GPIO ISR     │───────▶ │  EdgeRing   │──────▶ │ PulseDecoder │──▶ pending code
//! │ (any edge)   │         │ (lock-free) │  drain │  (main loop) │
//! └──────────────┘         └─────────────┘        └──────────────┘
//! ```
//!
//! ## Protocol 1
//!
//! Pulse length `T` ≈ 350 µs.  Each bit is a HIGH/LOW pair: `0` is
//! 1T/3T, `1` is 3T/1T.  A frame ends with a sync of 1T HIGH and 31T LOW;
//! remotes repeat the frame for as long as the key is held.  `T` is
//! recovered from the sync gap itself, so slightly fast or slow remotes
//! still decode, with 60 % tolerance on every pulse.
//!
//! A code is accepted once two consecutive frames decode to the same
//! value.  Holding the key keeps repeating frames; the same code is then
//! reported again only after a one second hold-off.

use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use log::debug;

use crate::app::ports::RadioReceiverPort;

// ───────────────────────────────────────────────────────────────
// Lock-free SPSC ring
// ───────────────────────────────────────────────────────────────
//
// ISR writes (produces), main loop reads (consumes).  One slot is kept
// free to tell "full" from "empty".

/// Pending edge durations.  Power of 2 for cheap modulo.
const EDGE_RING_CAP: usize = 512;

pub struct EdgeRing {
    head: AtomicU16,
    tail: AtomicU16,
    slots: [AtomicU32; EDGE_RING_CAP],
    dropped: AtomicU32,
}

impl EdgeRing {
    pub const fn new() -> Self {
        Self {
            head: AtomicU16::new(0),
            tail: AtomicU16::new(0),
            slots: [const { AtomicU32::new(0) }; EDGE_RING_CAP],
            dropped: AtomicU32::new(0),
        }
    }

    /// Push one duration.  Safe to call from ISR context (lock-free).
    /// Returns `false` if the ring is full (duration dropped).
    pub fn push(&self, duration_us: u32) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        let next_head = (head + 1) % EDGE_RING_CAP as u16;

        if next_head == tail {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        self.slots[head as usize].store(duration_us, Ordering::Relaxed);
        self.head.store(next_head, Ordering::Release);
        true
    }

    /// Pop the oldest duration.  Main loop only (single consumer).
    pub fn pop(&self) -> Option<u32> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if tail == head {
            return None;
        }

        let value = self.slots[tail as usize].load(Ordering::Relaxed);
        self.tail
            .store((tail + 1) % EDGE_RING_CAP as u16, Ordering::Release);
        Some(value)
    }

    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Relaxed) as usize;
        let tail = self.tail.load(Ordering::Relaxed) as usize;
        (head + EDGE_RING_CAP - tail) % EDGE_RING_CAP
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Durations lost to a full ring since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for EdgeRing {
    fn default() -> Self {
        Self::new()
    }
}

/// Ring fed by the GPIO ISR.  `static` because ESP-IDF ISR callbacks
/// cannot capture state.
pub static RF_EDGES: EdgeRing = EdgeRing::new();

/// Low 32 bits of `esp_timer_get_time()` at the previous edge.  Wraps
/// every ~71 minutes; durations use `wrapping_sub`.
#[cfg(target_os = "espidf")]
static LAST_EDGE_US: AtomicU32 = AtomicU32::new(0);

#[cfg(target_os = "espidf")]
unsafe extern "C" fn rf_edge_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: esp_timer_get_time is a counter read; safe in ISR context.
    let now = unsafe { esp_idf_svc::sys::esp_timer_get_time() } as u32;
    let last = LAST_EDGE_US.swap(now, Ordering::Relaxed);
    RF_EDGES.push(now.wrapping_sub(last));
}

/// Configure the receiver DATA pin as an input and attach the any-edge
/// ISR that feeds [`RF_EDGES`].
#[cfg(target_os = "espidf")]
pub fn init_rf_isr(gpio: i32) -> crate::Result<()> {
    use esp_idf_svc::sys::*;

    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << gpio,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_ANYEDGE,
    };
    // SAFETY: called once from the main task during boot, before the ISR
    // is registered.  The handler only touches atomics.
    unsafe {
        if gpio_config(&cfg) != ESP_OK {
            return Err(crate::Error::Init("rf gpio config"));
        }
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(crate::Error::Init("gpio isr service"));
        }
        if gpio_isr_handler_add(gpio, Some(rf_edge_isr), core::ptr::null_mut()) != ESP_OK {
            return Err(crate::Error::Init("rf isr handler"));
        }
        gpio_intr_enable(gpio);
    }
    log::info!("RF: receiver ISR attached to GPIO{}", gpio);
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Protocol 1 decoder
// ───────────────────────────────────────────────────────────────

/// Nominal pulse length of protocol 1 (µs).
pub const PULSE_LENGTH_US: u32 = 350;
/// Sync LOW length in pulses.
const SYNC_FACTOR: u32 = 31;
/// Any LOW longer than this ends a frame (µs).
const SEPARATION_LIMIT_US: u32 = 4_300;
/// Per-pulse tolerance, percent of `T`.
const TOLERANCE_PCT: u32 = 60;
/// Longest pulse length a sync gap may imply (µs).  Anything longer is
/// silence before the frame, not a sync.
const MAX_PULSE_US: u32 = 3 * PULSE_LENGTH_US;
/// Longest frame: sync + 32 bit pairs + sync HIGH, with some slack.
const MAX_CHANGES: usize = 67;
/// Same code is not reported twice within this window (µs).
const REPEAT_HOLDOFF_US: u32 = 1_000_000;

pub struct PulseDecoder {
    timings: heapless::Vec<u32, MAX_CHANGES>,
    last_frame: Option<u32>,
    last_accepted: Option<u32>,
    since_accept_us: u32,
}

impl PulseDecoder {
    pub fn new() -> Self {
        Self {
            timings: heapless::Vec::new(),
            last_frame: None,
            last_accepted: None,
            since_accept_us: REPEAT_HOLDOFF_US,
        }
    }

    /// Feed one edge-to-edge duration.  Returns a code when this edge
    /// completed a confirmed frame.
    pub fn feed(&mut self, duration_us: u32) -> Option<u32> {
        self.since_accept_us = self.since_accept_us.saturating_add(duration_us);

        let mut accepted = None;
        if duration_us > SEPARATION_LIMIT_US {
            accepted = match self.decode_frame() {
                Some(code) => self.confirm(code),
                None => {
                    self.last_frame = None;
                    None
                }
            };
            self.timings.clear();
        }

        if self.timings.is_full() {
            // Too long to be a frame: noise.
            self.timings.clear();
            self.last_frame = None;
        }
        // Cannot fail: the buffer was just cleared if it was full.
        let _ = self.timings.push(duration_us);
        accepted
    }

    /// Decode the frame collected since the previous gap.  `timings[0]` is
    /// that gap, followed by HIGH/LOW bit pairs and the trailing sync HIGH.
    fn decode_frame(&self) -> Option<u32> {
        let t = &self.timings;
        if t.len() < 8 || t[0] <= SEPARATION_LIMIT_US {
            return None;
        }

        let pulse = t[0] / SYNC_FACTOR;
        if pulse > MAX_PULSE_US {
            return None;
        }
        let tolerance = pulse * TOLERANCE_PCT / 100;
        let close = |actual: u32, pulses: u32| actual.abs_diff(pulse * pulses) < tolerance;

        let mut code: u32 = 0;
        let mut i = 1;
        while i + 1 < t.len() {
            code <<= 1;
            if close(t[i], 1) && close(t[i + 1], 3) {
                // zero
            } else if close(t[i], 3) && close(t[i + 1], 1) {
                code |= 1;
            } else {
                return None;
            }
            i += 2;
        }

        (code != 0).then_some(code)
    }

    fn confirm(&mut self, code: u32) -> Option<u32> {
        if self.last_frame.replace(code) != Some(code) {
            debug!("RF: frame {} (unconfirmed)", code);
            return None;
        }
        self.last_frame = None;

        if self.last_accepted == Some(code) && self.since_accept_us < REPEAT_HOLDOFF_US {
            return None;
        }
        self.last_accepted = Some(code);
        self.since_accept_us = 0;
        Some(code)
    }
}

impl Default for PulseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Receiver
// ───────────────────────────────────────────────────────────────

/// Drains an [`EdgeRing`] into a [`PulseDecoder`] and buffers one value.
pub struct RfReceiver {
    edges: &'static EdgeRing,
    decoder: PulseDecoder,
    pending: Option<u32>,
}

impl RfReceiver {
    /// Receiver fed by the GPIO ISR ring.
    pub fn new() -> Self {
        Self::with_ring(&RF_EDGES)
    }

    pub fn with_ring(edges: &'static EdgeRing) -> Self {
        Self {
            edges,
            decoder: PulseDecoder::new(),
            pending: None,
        }
    }

    /// Decode everything the ISR queued since the last call.  A newer code
    /// replaces an older one still pending.
    pub fn drain(&mut self) {
        while let Some(duration) = self.edges.pop() {
            if let Some(code) = self.decoder.feed(duration) {
                if let Some(old) = self.pending.replace(code) {
                    debug!("RF: pending code {} overwritten", old);
                }
            }
        }
    }

    /// Simulation: make `code` the pending value as if a remote sent it.
    #[cfg(not(target_os = "espidf"))]
    pub fn inject_code(&mut self, code: u32) {
        self.pending = Some(code);
    }
}

impl Default for RfReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioReceiverPort for RfReceiver {
    fn take_code(&mut self) -> Option<u32> {
        self.drain();
        self.pending.take()
    }
}
