//! Hardware bring-up and task wiring for the esp32 build.

use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{Runner, Stack, StackResources};
use embassy_time::{Duration, Instant, Ticker};
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use esp_radio::wifi::{Config as WifiRuntimeConfig, WifiDevice};
use heapless::Vec;
use static_cell::StaticCell;

use crate::network::config::NetworkConfig;
use crate::network::supervisor::NetworkSupervisor;
use crate::network::types::LinkEvent;

use super::captive_dns::CaptiveDns;
use super::esp_driver::EspNetworkDriver;

const TICK_PERIOD_MS: u64 = 100;
const DNS_PACKET_BUF: usize = 1024;
const LINK_EVENTS_PER_TICK: usize = 8;

pub fn run() -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    esp_println::logger::init_logger(log::LevelFilter::Info);

    static RADIO_CTRL: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
    static STACK_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();

    let radio_ctrl = RADIO_CTRL.init(esp_radio::init().expect("failed to init radio"));
    let (controller, ifaces) =
        esp_radio::wifi::new(radio_ctrl, peripherals.WIFI, WifiRuntimeConfig::default())
            .expect("failed to init wifi");

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;
    let (stack, net_runner) = embassy_net::new(
        ifaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        STACK_RESOURCES.init(StackResources::new()),
        seed,
    );

    let redirector = CaptiveDns::new(dns_socket(stack));

    let station_mac = esp_hal::efuse::Efuse::mac_address();
    let device_id = device_id_from_mac(station_mac);

    let driver = EspNetworkDriver::new(controller, stack, redirector, station_mac);
    let mut supervisor = NetworkSupervisor::new(driver, device_id);

    // Placeholder until the persisted-settings layer lands here; defaults
    // keep the admin AP reachable for first-time provisioning.
    let config = NetworkConfig::default();
    supervisor.init(&config, Instant::now());

    let mut executor = esp_rtos::embassy::Executor::new();
    executor.run(move |spawner| {
        spawner.must_spawn(net_task(net_runner));
        spawner.must_spawn(supervisor_task(supervisor, config));
    })
}

fn dns_socket(stack: Stack<'static>) -> UdpSocket<'static> {
    static RX_META: StaticCell<[PacketMetadata; 8]> = StaticCell::new();
    static RX_BUF: StaticCell<[u8; DNS_PACKET_BUF]> = StaticCell::new();
    static TX_META: StaticCell<[PacketMetadata; 8]> = StaticCell::new();
    static TX_BUF: StaticCell<[u8; DNS_PACKET_BUF]> = StaticCell::new();

    UdpSocket::new(
        stack,
        RX_META.init([PacketMetadata::EMPTY; 8]),
        RX_BUF.init([0; DNS_PACKET_BUF]),
        TX_META.init([PacketMetadata::EMPTY; 8]),
        TX_BUF.init([0; DNS_PACKET_BUF]),
    )
}

/// Stable identifier shown in the AP name and hostname; derived from the
/// factory-programmed station MAC.
fn device_id_from_mac(mac: [u8; 6]) -> u32 {
    u32::from_be_bytes([0, mac[3], mac[4], mac[5]])
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

#[embassy_executor::task]
async fn supervisor_task(
    mut supervisor: NetworkSupervisor<EspNetworkDriver>,
    config: NetworkConfig,
) {
    let mut ticker = Ticker::every(Duration::from_millis(TICK_PERIOD_MS));
    loop {
        let mut events: Vec<LinkEvent, LINK_EVENTS_PER_TICK> = Vec::new();
        supervisor.driver_mut().poll_link_events(|event| {
            let _ = events.push(event);
        });
        for event in events {
            supervisor.handle_link_event(event);
        }
        supervisor.tick(&config, Instant::now());
        ticker.next().await;
    }
}
