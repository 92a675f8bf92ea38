use std::fs::File;
use std::io::Read;

pub fn get_reader(file: File) -> Result<impl Read, String> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::BufReader;
        // Trace lines are short; a generous buffer keeps syscalls off the replay loop
        const BUFFER_SIZE: usize = 1 << 20;
        Ok(BufReader::with_capacity(BUFFER_SIZE, file))
    }
    // Memory map the trace for speed on unix systems
    #[cfg(unix)]
    {
        use memmap2::{Advice, Mmap};
        use std::io::Cursor;
        // The replay is a single sequential pass, so tell the OS as much
        unsafe {
            let m = Mmap::map(&file).map_err(|e| format!("Couldn't memory map the trace: {e}"))?;
            m.advise(Advice::Sequential).map_err(|e| format!("Failed to provide access advice to the OS, {e}"))?;
            Ok(Cursor::new(m))
        }
    }
}
