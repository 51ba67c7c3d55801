use tundra_shared::{
    message_id::{self, MessageId},
    BitCounter, BitWrite, Deserializer, SerdeErr, Serializer,
};

/// A message the client can put on the wire.
pub trait NetworkMessage {
    fn id(&self) -> MessageId;

    fn name(&self) -> &'static str {
        message_id::message_name(self.id())
    }

    /// Writes everything after the message id.
    fn write_body(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr>;

    fn serialize(&self) -> Result<OutgoingMessage, SerdeErr> {
        OutgoingMessage::build(self.id(), |writer| self.write_body(writer))
    }
}

/// A message the client can read from the wire.
pub trait IncomingMessage: Sized {
    const ID: MessageId;

    /// Reads everything after the message id.
    fn deserialize(reader: &mut Deserializer) -> Result<Self, SerdeErr>;
}

/// Bytes ready for the transport, message id included. Sending consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    id: MessageId,
    buffer: Option<Vec<u8>>,
}

impl OutgoingMessage {
    pub fn new(id: MessageId, buffer: Vec<u8>) -> Self {
        Self {
            id,
            buffer: Some(buffer),
        }
    }

    /// A message that was never serialized. Sending it is refused.
    pub fn unserialized(id: MessageId) -> Self {
        Self { id, buffer: None }
    }

    /// Sizes the body with a `BitCounter`, then writes id and body into an
    /// exactly sized buffer.
    pub fn build<F>(id: MessageId, write_body: F) -> Result<Self, SerdeErr>
    where
        F: Fn(&mut dyn BitWrite) -> Result<(), SerdeErr>,
    {
        let mut counter = BitCounter::new();
        counter.write_u16(id)?;
        write_body(&mut counter)?;

        let mut writer = Serializer::new(counter.bytes_needed());
        writer.write_u16(id)?;
        write_body(&mut writer)?;
        log::trace!("built {} message, {} bytes", message_id::message_name(id), writer.filled_bytes());
        Ok(Self::new(id, writer.into_bytes()))
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        message_id::message_name(self.id)
    }

    pub fn is_ready(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn buffer(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }

    pub fn len(&self) -> usize {
        self.buffer.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn into_buffer(self) -> Option<Vec<u8>> {
        self.buffer
    }
}

/// Writes a VLE byte size followed by the block `write` produces. The block
/// starts byte aligned and is padded to whole bytes, so the receiver can
/// read it with a nested reader.
pub fn write_sized_block<F>(writer: &mut dyn BitWrite, write: F) -> Result<(), SerdeErr>
where
    F: Fn(&mut dyn BitWrite) -> Result<(), SerdeErr>,
{
    let mut counter = BitCounter::new();
    write(&mut counter)?;
    let size = counter.bytes_needed();
    writer.write_vle(size as u32)?;
    write(writer)?;
    let padding = (size as u64 * 8 - counter.bits_needed()) as u8;
    if padding > 0 {
        writer.write_bits(0, padding)?;
    }
    Ok(())
}

/// Reads a block written by [`write_sized_block`] and hands back a reader
/// over exactly its bytes.
pub fn read_sized_block<'b>(reader: &mut Deserializer<'b>) -> Result<Deserializer<'b>, SerdeErr> {
    let size = reader.read_vle()? as usize;
    reader.sub_reader(size)
}
