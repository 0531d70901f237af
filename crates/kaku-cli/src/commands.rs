//! Subcommand implementations.

use anyhow::{Context, Result};
use kaku_core::CommandWord;
use kaku_core::constants::COMMAND_LEN;
use kaku_device::{AsyncSession, DeviceConfig, KakuDevice, LineSink};
use kaku_hardware::mock::MockLine;
use kaku_hardware::{AnyOutputLine, TimedSink};
use kaku_protocol::{CommandBuilder, Telegram};
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

/// Print the decoded schedule of `word`. Touches no hardware.
pub fn encode(word: CommandWord) -> Result<()> {
    let schedule = Telegram::new(word).schedule();
    println!("{}", serde_json::to_string_pretty(&schedule)?);
    Ok(())
}

/// Print the command word assembled from the given fields.
pub fn build(trits: &str, period_us: u32, repeat_exp: u8) -> Result<()> {
    let word = CommandBuilder::new()
        .trits(trits)?
        .period_us(period_us)
        .repeat_exponent(repeat_exp)
        .build()?;
    println!("{word}");
    Ok(())
}

/// Open the device, transmit one word, close and shut down.
pub async fn send(config: DeviceConfig, word: CommandWord, dry_run: bool) -> Result<()> {
    let device = start_device(config, dry_run)?;

    let mut session = AsyncSession::open(&device)?;
    session.write(&word.to_le_bytes()).await?;
    session.close();

    info!(%word, "Sent");
    device.shutdown()?;
    Ok(())
}

/// Transmit stdin records through one session until EOF.
pub async fn serve(config: DeviceConfig, dry_run: bool) -> Result<()> {
    let device = start_device(config, dry_run)?;
    let result = serve_records(&device, tokio::io::stdin()).await;

    device.shutdown()?;
    let sent = result?;
    info!(sent, "Input closed");
    Ok(())
}

async fn serve_records<R>(device: &KakuDevice<LineSink>, mut input: R) -> Result<u64>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut session = AsyncSession::open(device)?;
    let mut record = [0u8; COMMAND_LEN];
    let mut sent = 0;

    loop {
        let filled = read_record(&mut input, &mut record).await?;
        if filled < COMMAND_LEN {
            if filled > 0 {
                warn!(len = filled, "Dropping incomplete trailing record");
            }
            break;
        }
        session.write(&record).await?;
        sent += 1;
    }

    session.close();
    Ok(sent)
}

/// Fill `record` from `input`, returning fewer bytes only at EOF.
async fn read_record<R>(input: &mut R, record: &mut [u8; COMMAND_LEN]) -> Result<usize>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < COMMAND_LEN {
        let n = input
            .read(&mut record[filled..])
            .await
            .context("Failed to read command record")?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

fn start_device(config: DeviceConfig, dry_run: bool) -> Result<KakuDevice<LineSink>> {
    if dry_run {
        let (line, _handle) = MockLine::new(config.line);
        return Ok(KakuDevice::start(
            config,
            TimedSink::new(AnyOutputLine::from(line)),
        )?);
    }

    let line = config.line;
    KakuDevice::from_config(config).with_context(|| format!("Failed to start on line {line}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dry_device() -> KakuDevice<LineSink> {
        let config = DeviceConfig {
            tolerance_us: 1000,
            ..DeviceConfig::default()
        };
        start_device(config, true).unwrap()
    }

    #[test]
    fn test_build_rejects_bad_trits() {
        assert!(build("0F0F", 350, 3).is_err());
        assert!(build("0F0F0FFF0FF0", 512, 3).is_err());
    }

    #[tokio::test]
    async fn test_serve_counts_full_records() {
        let device = dry_device();
        // Two zero-period words and a trailing partial record.
        let input: &[u8] = &[0, 0, 0, 0, 0, 0, 0, 0, 1, 2];

        let sent = serve_records(&device, input).await.unwrap();
        assert_eq!(sent, 2);
        assert_eq!(device.stats().telegrams_sent, 2);
        assert!(!device.is_open());
    }

    #[tokio::test]
    async fn test_send_dry_run() {
        let config = DeviceConfig::default();
        send(config, CommandWord::new(0), true).await.unwrap();
    }
}
