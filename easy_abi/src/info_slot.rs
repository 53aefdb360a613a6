/// Output slot handed to `curl_easy_getinfo`.
///
/// Every result category (long, double, curl_off_t, pointer, socket) fits in
/// eight bytes; the alignment matches the strictest of them.
#[repr(C, align(8))]
#[derive(Debug, Default, Clone, Copy)]
pub struct InfoSlot {
    pub bytes: [u8; 8],
}

impl InfoSlot {
    pub fn as_mut_ptr(&mut self) -> *mut libc::c_void {
        self.bytes.as_mut_ptr() as *mut libc::c_void
    }

    pub fn read_long(&self) -> i64 {
        const WIDTH: usize = std::mem::size_of::<libc::c_long>();
        let mut raw = [0u8; WIDTH];
        raw.copy_from_slice(&self.bytes[..WIDTH]);
        libc::c_long::from_ne_bytes(raw) as i64
    }

    pub fn read_double(&self) -> f64 {
        f64::from_ne_bytes(self.bytes)
    }

    pub fn read_off_t(&self) -> i64 {
        i64::from_ne_bytes(self.bytes)
    }

    pub fn read_int(&self) -> i32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.bytes[..4]);
        i32::from_ne_bytes(raw)
    }

    pub fn read_ptr<T>(&self) -> *mut T {
        const WIDTH: usize = std::mem::size_of::<usize>();
        let mut raw = [0u8; WIDTH];
        raw.copy_from_slice(&self.bytes[..WIDTH]);
        usize::from_ne_bytes(raw) as *mut T
    }

    pub fn write_long(&mut self, value: i64) {
        const WIDTH: usize = std::mem::size_of::<libc::c_long>();
        let raw = (value as libc::c_long).to_ne_bytes();
        self.bytes[..WIDTH].copy_from_slice(&raw);
    }

    pub fn write_double(&mut self, value: f64) {
        self.bytes = value.to_ne_bytes();
    }

    pub fn write_off_t(&mut self, value: i64) {
        self.bytes = value.to_ne_bytes();
    }

    pub fn write_int(&mut self, value: i32) {
        self.bytes[..4].copy_from_slice(&value.to_ne_bytes());
    }

    pub fn write_ptr<T>(&mut self, ptr: *const T) {
        const WIDTH: usize = std::mem::size_of::<usize>();
        self.bytes[..WIDTH].copy_from_slice(&(ptr as usize).to_ne_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_and_double_share_the_slot_without_bleeding() {
        let mut slot = InfoSlot::default();
        slot.write_long(-404);
        assert_eq!(slot.read_long(), -404);

        slot.write_double(0.25);
        assert_eq!(slot.read_double(), 0.25);

        slot.write_off_t(1_234_567_890_123);
        assert_eq!(slot.read_off_t(), 1_234_567_890_123);
    }

    #[test]
    fn pointer_round_trips_through_bytes() {
        let value = 7u32;
        let mut slot = InfoSlot::default();
        slot.write_ptr(&value as *const u32);
        let back: *mut u32 = slot.read_ptr();
        assert_eq!(unsafe { *back }, 7);
    }
}
