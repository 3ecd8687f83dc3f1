use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

const BUFFER_SIZE: usize = 128 * 1024;

/// パスが標準入出力（`-`）を指すか
pub fn is_stdio<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().as_os_str() == "-"
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

/// 入力を開く。`-` は標準入力、拡張子 `.gz` は透過的に展開する。
pub fn open_reader<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead>> {
    let p = path.as_ref();
    if is_stdio(p) {
        return Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, io::stdin().lock())));
    }
    let f = File::open(p)?;
    if is_gzip(p) {
        let dec = flate2::read::MultiGzDecoder::new(f);
        return Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, dec)));
    }
    Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, f)))
}

/// 圧縮出力の finish エラーを取りこぼさないための Writer
#[must_use = "call .close() to propagate compression/IO errors"]
pub enum Writer {
    Plain(BufWriter<File>),
    Stdout(io::Stdout),
    Gz(flate2::write::GzEncoder<BufWriter<File>>),
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Writer::Plain(f) => f.write(buf),
            Writer::Stdout(s) => s.write(buf),
            Writer::Gz(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Writer::Plain(f) => f.flush(),
            Writer::Stdout(s) => s.flush(),
            Writer::Gz(e) => e.flush(),
        }
    }
}

impl Writer {
    /// ストリームを確定させる（gzip はトレーラを書く）
    pub fn close(self) -> io::Result<()> {
        match self {
            Writer::Plain(mut f) => f.flush(),
            Writer::Stdout(mut s) => s.flush(),
            Writer::Gz(e) => e.finish()?.flush(),
        }
    }
}

/// 出力を開く。`-` は標準出力、拡張子 `.gz` は gzip 圧縮。
pub fn open_writer<P: AsRef<Path>>(path: P) -> io::Result<Writer> {
    let p = path.as_ref();
    if is_stdio(p) {
        return Ok(Writer::Stdout(io::stdout()));
    }
    let f = BufWriter::with_capacity(BUFFER_SIZE, File::create(p)?);
    if is_gzip(p) {
        return Ok(Writer::Gz(flate2::write::GzEncoder::new(f, flate2::Compression::default())));
    }
    Ok(Writer::Plain(f))
}
