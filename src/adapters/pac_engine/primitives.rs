//! Host functions exposed to PAC scripts.
//!
//! None of them may throw into the script: failures become `null` or `false`.

use boa_engine::{js_string, Context, JsResult, JsString, JsValue, NativeFunction};
use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs, UdpSocket};

/// Public address used to pick the outbound interface. Nothing is sent to it.
const ROUTE_PROBE: (Ipv4Addr, u16) = (Ipv4Addr::new(8, 8, 8, 8), 65530);

pub fn register(context: &mut Context) -> JsResult<()> {
    context.register_global_callable(js_string!("dnsResolve"), 1, NativeFunction::from_fn_ptr(dns_resolve))?;
    context.register_global_callable(js_string!("myIpAddress"), 0, NativeFunction::from_fn_ptr(my_ip_address))?;
    context.register_global_callable(
        js_string!("isValidIpAddress"),
        1,
        NativeFunction::from_fn_ptr(is_valid_ip_address),
    )?;
    Ok(())
}

/// First IPv4 address `name` resolves to.
pub fn resolve_ipv4(name: &str) -> Option<Ipv4Addr> {
    if name.is_empty() {
        return None;
    }
    (name, 0)
        .to_socket_addrs()
        .ok()?
        .find_map(|addr| match addr.ip() {
            IpAddr::V4(ip) => Some(ip),
            IpAddr::V6(_) => None,
        })
}

/// IPv4 address of the interface the routing table picks for outbound traffic.
///
/// Connecting a UDP socket only selects a route; no packet leaves the host.
pub fn local_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(ROUTE_PROBE).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() => Some(ip),
        _ => None,
    }
}

pub fn is_valid_ip(value: &str) -> bool {
    value.parse::<IpAddr>().is_ok()
}

fn string_arg(args: &[JsValue], index: usize) -> Option<String> {
    args.get(index)
        .and_then(|v| v.as_string())
        .map(|s| s.to_std_string_escaped())
}

fn ip_value(ip: Option<Ipv4Addr>) -> JsValue {
    match ip {
        Some(ip) => JsValue::from(JsString::from(ip.to_string().as_str())),
        None => JsValue::null(),
    }
}

fn dns_resolve(_this: &JsValue, args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
    let ip = string_arg(args, 0).and_then(|name| resolve_ipv4(&name));
    Ok(ip_value(ip))
}

fn my_ip_address(_this: &JsValue, _args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
    Ok(ip_value(local_ipv4()))
}

fn is_valid_ip_address(_this: &JsValue, args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
    let valid = string_arg(args, 0).map(|v| is_valid_ip(&v)).unwrap_or(false);
    Ok(JsValue::from(valid))
}
