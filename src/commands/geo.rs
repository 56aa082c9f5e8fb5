//! Geospatial commands (`GEOADD`/`GEOPOS`/`GEODIST`).

use crate::client::Client;
use crate::value;
use crate::Future;

pub trait GeoCommands {
    fn geoadd<'a>(&'a self, key: impl Into<Vec<u8>>, members: Vec<(f64, f64, Vec<u8>)>) -> Future<'a, i64>;
    fn geopos<'a>(&'a self, key: impl Into<Vec<u8>>, members: Vec<Vec<u8>>) -> Future<'a, Vec<Option<(f64, f64)>>>;
    fn geodist<'a>(
        &'a self,
        key: impl Into<Vec<u8>>,
        member1: impl Into<Vec<u8>>,
        member2: impl Into<Vec<u8>>,
        unit: &'a str,
    ) -> Future<'a, Option<f64>>;
}

impl GeoCommands for Client {
    fn geoadd<'a>(&'a self, key: impl Into<Vec<u8>>, members: Vec<(f64, f64, Vec<u8>)>) -> Future<'a, i64> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let mut args = vec![b"GEOADD".to_vec(), key];
            for (longitude, latitude, member) in members {
                args.push(longitude.to_string().into_bytes());
                args.push(latitude.to_string().into_bytes());
                args.push(member);
            }
            value::from_value(self.call(args).await?)
        })
    }

    fn geopos<'a>(&'a self, key: impl Into<Vec<u8>>, members: Vec<Vec<u8>>) -> Future<'a, Vec<Option<(f64, f64)>>> {
        let key = key.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let mut args = vec![b"GEOPOS".to_vec(), key];
            args.extend(members);
            let result = self.call(args).await?;
            let raw: Vec<Option<(String, String)>> = value::from_value(result)?;
            raw.into_iter()
                .map(|entry| match entry {
                    None => Ok(None),
                    Some((lon, lat)) => {
                        let lon: f64 = lon
                            .parse()
                            .map_err(|_| crate::error::Error::Argument("malformed longitude".into()))?;
                        let lat: f64 = lat
                            .parse()
                            .map_err(|_| crate::error::Error::Argument("malformed latitude".into()))?;
                        Ok(Some((lon, lat)))
                    }
                })
                .collect()
        })
    }

    fn geodist<'a>(
        &'a self,
        key: impl Into<Vec<u8>>,
        member1: impl Into<Vec<u8>>,
        member2: impl Into<Vec<u8>>,
        unit: &'a str,
    ) -> Future<'a, Option<f64>> {
        let key = key.into();
        let member1 = member1.into();
        let member2 = member2.into();
        Box::pin(async move {
            let key = self.prefixed_key(key)?;
            let args = vec![b"GEODIST".to_vec(), key, member1, member2, unit.as_bytes().to_vec()];
            let result = self.call(args).await?;
            match result {
                crate::value::Value::Nil => Ok(None),
                other => {
                    let text = value::to_utf8_string(&other)?;
                    Ok(Some(
                        text.parse()
                            .map_err(|_| crate::error::Error::Argument("malformed distance".into()))?,
                    ))
                }
            }
        })
    }
}
