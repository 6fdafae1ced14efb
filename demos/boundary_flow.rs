use status_chain::{
    external, specialize, wrap, Chain, Detail, RemoteError, Result, StatusCode, WireDetail,
    WireStatus,
};

fn read_profile(user: u32) -> Result<String> {
    if user == 0 {
        return Err(external!(StatusCode::PermissionDenied, "user {} may not read profiles", user));
    }
    Ok(format!("profile-{}", user))
}

fn handler(user: u32) -> Result<String> {
    read_profile(user).map_err(|err| wrap!(err, "handling profile request"))
}

fn main() {
    println!("--- Boundary Flow Example ---\n");

    // 1. A local failure, wrapped by a generic layer, enriched by middleware.
    if let Err(err) = handler(0) {
        let err = err.add_details([Detail::new("type.example.com/RequestInfo", b"req-17".to_vec())]);

        println!("1. [WIRE RESPONSE] What the caller receives:");
        let wire = err.to_wire();
        println!("   code={} message=\"{}\"", wire.code, wire.message);
        for detail in &wire.details {
            println!("   detail {} ({} bytes)", detail.type_tag, detail.payload.len());
        }

        println!("\n2. [INTERNAL LOG] What the operator sees:");
        err.with_internal_log(|log| {
            let mut line = String::new();
            if log.write_to(&mut line).is_ok() {
                println!("   {}", line);
            }
        });

        println!("\n3. [DISPLAY VIEW] {:?}", specialize(Some(&err)));
    }

    // 2. A failure relayed from an upstream peer, whose details are read-only.
    let inbound = WireStatus {
        code: StatusCode::Unavailable.as_i32(),
        message: "shard offline".to_string(),
        details: vec![WireDetail {
            type_tag: "type.example.com/Shard".to_string(),
            payload: b"shard-3".to_vec(),
        }],
    };

    match RemoteError::try_from(inbound) {
        Ok(remote) => {
            let relayed = Chain::from(remote)
                .context("fetching timeline")
                .add_details([Detail::new("type.example.com/Relay", b"edge-1".to_vec())]);
            let wire = relayed.to_wire();
            println!("\n4. [RELAYED] code={} details={}", wire.code, wire.details.len());
        }
        Err(err) => println!("\n4. [REJECTED] {}", err),
    }

    // 3. No error at all.
    println!("\n5. [SUCCESS] {:?}", specialize(handler(7).err().as_ref()));
}
